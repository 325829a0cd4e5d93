use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// A request-scoped file on local storage that is deleted when dropped.
///
/// `remove` may be called explicitly to observe deletion errors; after that
/// the drop is a no-op. Removing a file that is already gone is not an error.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    removed: bool,
}

impl TempFile {
    /// Take ownership of an existing (or about to be created) path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now.
    pub fn remove(&mut self) -> io::Result<()> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed temp file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!("Failed to remove temp file {}: {}", self.path.display(), e);
        }
    }
}
