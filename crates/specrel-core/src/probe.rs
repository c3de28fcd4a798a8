//! Filesystem probe used for existence checks and output writes.

use std::io;
use std::path::Path;

/// Filesystem operations the release core performs.
///
/// Existence checks can fail with an I/O error, which callers report
/// distinctly from "does not exist".
pub trait FileProbe: Send + Sync {
    /// Check whether `path` exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if existence cannot be determined.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Create `path` and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write `contents` to `path`, replacing any existing file.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`FileProbe`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}
