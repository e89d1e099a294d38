use crate::upload::{UploadItem, sanitize_file_name};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub(crate) const REQUEST_DIR_PREFIX: &str = "req-";

/// Request scoped holding area for uploaded frames.
///
/// Every store owns a freshly created, randomly named directory below the uploads
/// root. The directory and everything written into it is removed on drop; removal
/// failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct FrameStore {
    dir: PathBuf,
    stored: usize,
}

impl FrameStore {
    pub fn create(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(REQUEST_DIR_PREFIX)
            .tempdir_in(root)?
            .keep();

        debug!(?dir, "Frame store created");
        Ok(Self { dir, stored: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Number of uploads written so far
    pub(crate) fn len(&self) -> usize {
        self.stored
    }

    /// Write one upload to disk and return where it landed.
    ///
    /// Stored names are prefixed with the submission index so equal client names
    /// within one batch never overwrite each other.
    pub fn persist(&mut self, item: &UploadItem) -> io::Result<PathBuf> {
        let name = format!("{:04}-{}", self.stored, sanitize_file_name(&item.file_name));
        let path = self.dir.join(name);
        std::fs::write(&path, &item.data)?;
        self.stored += 1;
        Ok(path)
    }
}

impl Drop for FrameStore {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = ?self.dir, files = self.stored, "Frame store removed"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(dir = ?self.dir, %error, "Failed to remove frame store"),
        }
    }
}
