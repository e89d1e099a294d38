//! Frame decoding and GIF encoding on top of the `image` codecs.
//!
//! Both operations are blocking and CPU bound, callers in async context should
//! run them through `tokio::task::spawn_blocking`.

use crate::params::AnimationParams;
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, ImageError, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const MIN_FRAMES: usize = 2;

/// Quantization speed handed to the GIF encoder (1 = best, 30 = fastest).
const QUANTIZATION_SPEED: i32 = 10;

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("at least {MIN_FRAMES} frames are required, got {0}")]
    TooFewFrames(usize),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to encode animation: {0}")]
    Encode(#[source] ImageError),
}

/// Decode one stored image file into an RGBA frame.
///
/// The format is sniffed from the content first, the extension is only a fallback.
pub fn decode_frame(path: &Path) -> Result<RgbaImage, AnimationError> {
    let decode_err = |source: ImageError| AnimationError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|error| decode_err(ImageError::IoError(error)))?
        .decode()
        .map_err(decode_err)?;

    debug!(?path, width = image.width(), height = image.height(), "Decoded frame");
    Ok(image.into_rgba8())
}

/// Encode an ordered frame sequence into an animated GIF.
///
/// The first frame fixes the canvas size; every other frame is fitted onto it.
pub fn encode_gif(
    frames: &[RgbaImage],
    params: AnimationParams,
) -> Result<Vec<u8>, AnimationError> {
    if frames.len() < MIN_FRAMES {
        return Err(AnimationError::TooFewFrames(frames.len()));
    }

    let (width, height) = frames[0].dimensions();
    let delay = Delay::from_numer_denom_ms(gif_delay_ms(params.duration_ms), 1);
    let repeat = if params.is_infinite() {
        Repeat::Infinite
    } else {
        Repeat::Finite(params.loop_count)
    };

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, QUANTIZATION_SPEED);
        encoder.set_repeat(repeat).map_err(AnimationError::Encode)?;

        let gif_frames = frames
            .iter()
            .map(|frame| Frame::from_parts(fit_to_canvas(frame, width, height), 0, 0, delay));
        encoder.encode_frames(gif_frames).map_err(AnimationError::Encode)?;
    }

    debug!(
        frames = frames.len(),
        width,
        height,
        duration_ms = params.duration_ms,
        loop_count = params.loop_count,
        size = buf.len(),
        "Encoded GIF"
    );
    Ok(buf)
}

/// GIF delays are stored in centiseconds; round to the nearest one.
fn gif_delay_ms(duration_ms: u32) -> u32 {
    duration_ms.saturating_add(5) / 10 * 10
}

/// Scale `frame` to fit inside a `width`x`height` canvas keeping its aspect ratio,
/// centered on a transparent background.
fn fit_to_canvas(frame: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }

    let (fw, fh) = frame.dimensions();
    let scale = f64::min(width as f64 / fw as f64, height as f64 / fh as f64);
    let nw = ((fw as f64 * scale).round() as u32).clamp(1, width);
    let nh = ((fh as f64 * scale).round() as u32).clamp(1, height);

    let resized = imageops::resize(frame, nw, nh, FilterType::Triangle);
    let mut canvas = RgbaImage::new(width, height);
    imageops::overlay(
        &mut canvas,
        &resized,
        i64::from((width - nw) / 2),
        i64::from((height - nh) / 2),
    );
    canvas
}
