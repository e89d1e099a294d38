use crate::frame_store::{FrameStore, REQUEST_DIR_PREFIX};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    uploads_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(uploads_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(uploads_dir)?;
        sweep_stale_stores(uploads_dir);
        info!(?uploads_dir, "Uploads directory ready");

        Ok(Self {
            uploads_dir: Arc::new(uploads_dir.to_path_buf()),
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        self.uploads_dir.as_path()
    }

    /// Open a fresh holding area for one request.
    pub fn frame_store(&self) -> std::io::Result<FrameStore> {
        FrameStore::create(self.uploads_dir())
    }
}

/// Remove holding areas left behind by a previous process that died mid-request.
fn sweep_stale_stores(uploads_dir: &Path) {
    let Ok(entries) = std::fs::read_dir(uploads_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_store = entry.file_name().to_string_lossy().starts_with(REQUEST_DIR_PREFIX);
        if !is_store || !path.is_dir() {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => info!(?path, "Removed stale frame store"),
            Err(error) => warn!(?path, %error, "Failed to remove stale frame store"),
        }
    }
}
