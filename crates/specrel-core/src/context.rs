//! Per-invocation context supplied by the orchestrator.

use std::path::{Path, PathBuf};

/// Orchestrator context for one stage invocation.
#[derive(Clone, Debug)]
pub struct ReleaseContext {
    cwd: PathBuf,
}

impl ReleaseContext {
    /// Create a context rooted at `cwd`.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Resolve a configured path against the working directory.
    ///
    /// Absolute paths are returned unchanged. No normalization is applied.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(relative)
    }
}
