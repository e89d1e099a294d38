#![allow(dead_code)]

use gif_creator::Config;
use image::{ImageFormat, Rgba, RgbaImage};
use reqwest::multipart::{Form, Part};
use std::io::Cursor;
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::OnceCell;
use tokio::time::sleep;

pub static SHARED_SERVER: OnceCell<TestServer> = OnceCell::const_new();

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// One file part of a `/create_gif` request
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn png(file_name: &str, color: [u8; 4]) -> Self {
        Self {
            file_name: file_name.to_string(),
            data: solid_png(10, 10, color),
        }
    }

    pub fn raw(file_name: &str, data: &[u8]) -> Self {
        Self {
            file_name: file_name.to_string(),
            data: data.to_vec(),
        }
    }
}

/// Test harness that runs the server on its own runtime thread
pub struct TestServer {
    _handle: JoinHandle<()>,
    port: u16,
    workspace: TempDir,
}

impl TestServer {
    /// Get or create shared test server instance
    pub async fn shared() -> &'static TestServer {
        SHARED_SERVER.get_or_init(|| async { Self::start().await }).await
    }

    /// Start a dedicated server with a private workspace
    pub async fn start() -> Self {
        Self::start_with_upload_limit(Config::default().max_upload_mb).await
    }

    /// Start a dedicated server accepting request bodies up to `max_upload_mb`
    pub async fn start_with_upload_limit(max_upload_mb: usize) -> Self {
        let _ = tracing_subscriber::fmt::try_init();

        let port = portpicker::pick_unused_port().expect("No available port");
        let workspace = tempfile::tempdir().expect("Failed to create workspace");

        let config = Config {
            listen_on_port: port,
            workspace: workspace.path().to_string_lossy().into_owned(),
            max_upload_mb,
            ..Default::default()
        };

        let handle = std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                gif_creator::run(config).await.expect("Server exited with error");
            });
        });

        let server = TestServer {
            _handle: handle,
            port,
            workspace,
        };

        // Poll until server is ready
        let client = server.client();
        for _ in 0..200 {
            if let Ok(response) = client.get(server.url()).send().await
                && response.status().is_success()
            {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        server
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.workspace.path().join("temp_uploads")
    }

    /// Number of entries currently held in the uploads directory
    pub fn held_entries(&self) -> usize {
        std::fs::read_dir(self.uploads_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    /// POST a multipart batch to `/create_gif`
    pub async fn create_gif(
        &self,
        client: &reqwest::Client,
        uploads: Vec<Upload>,
        duration: Option<&str>,
        loop_count: Option<&str>,
    ) -> reqwest::Response {
        let mut form = Form::new();
        for upload in uploads {
            let part = Part::bytes(upload.data)
                .file_name(upload.file_name)
                .mime_str("image/png")
                .unwrap();
            form = form.part("images", part);
        }
        if let Some(duration) = duration {
            form = form.text("duration", duration.to_string());
        }
        if let Some(loop_count) = loop_count {
            form = form.text("loop", loop_count.to_string());
        }

        self.post_form(client, form).await
    }

    pub async fn post_form(&self, client: &reqwest::Client, form: Form) -> reqwest::Response {
        client
            .post(format!("{}create_gif", self.url()))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}

pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    RgbaImage::from_pixel(width, height, Rgba(color))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// A GIF taken apart with the reference decoder
pub struct DecodedGif {
    /// Per-frame delay in centiseconds
    pub delays: Vec<u16>,
    /// RGBA value of each frame's first pixel
    pub first_pixels: Vec<[u8; 4]>,
    pub repeat: gif::Repeat,
}

impl DecodedGif {
    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }
}

pub fn decode_gif(bytes: &[u8]) -> DecodedGif {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(bytes)).unwrap();

    let mut delays = Vec::new();
    let mut first_pixels = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        delays.push(frame.delay);
        let px = &frame.buffer[..4];
        first_pixels.push([px[0], px[1], px[2], px[3]]);
    }

    DecodedGif {
        delays,
        first_pixels,
        repeat: decoder.repeat(),
    }
}

/// Index of the strongest RGB channel, good enough to tell solid test colors apart
/// after palette quantization.
pub fn dominant_channel(pixel: [u8; 4]) -> usize {
    (0..3).max_by_key(|&i| pixel[i]).unwrap()
}
