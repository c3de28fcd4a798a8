//! Capability resolution for document-processing libraries.
//!
//! The core never hardcodes how a library is found: it asks a
//! [`LibraryResolver`] for a name and gets a handle or an error.

use std::collections::HashMap;
use std::sync::Arc;

use specrel_config::DEFAULT_LIBRARY;

use crate::library::{MarkdownLibrary, SpecLibrary};

/// Error returned when a library cannot be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Library '{name}' was not found locally or globally")]
    NotFound { name: String },
}

/// Resolves a document-processing library by name.
pub trait LibraryResolver: Send + Sync {
    /// Resolve `name` to a library handle.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if neither lookup finds the library.
    fn resolve(&self, name: &str) -> Result<Arc<dyn SpecLibrary>, ResolveError>;
}

/// Two-tier library registry: local entries first, then global.
#[derive(Default)]
pub struct LibraryRegistry {
    local: HashMap<String, Arc<dyn SpecLibrary>>,
    global: HashMap<String, Arc<dyn SpecLibrary>>,
}

impl LibraryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in markdown library installed locally.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_local(DEFAULT_LIBRARY, Arc::new(MarkdownLibrary::new()))
    }

    /// Register a library in the local table.
    #[must_use]
    pub fn with_local(mut self, name: impl Into<String>, library: Arc<dyn SpecLibrary>) -> Self {
        self.local.insert(name.into(), library);
        self
    }

    /// Register a library in the global table.
    #[must_use]
    pub fn with_global(mut self, name: impl Into<String>, library: Arc<dyn SpecLibrary>) -> Self {
        self.global.insert(name.into(), library);
        self
    }
}

impl LibraryResolver for LibraryRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn SpecLibrary>, ResolveError> {
        if let Some(library) = self.local.get(name) {
            return Ok(Arc::clone(library));
        }
        tracing::debug!(name, "Library not found locally, checking globally");
        self.global
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| ResolveError::NotFound {
                name: name.to_owned(),
            })
    }
}

impl std::fmt::Debug for LibraryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryRegistry")
            .field("local", &self.local.keys().collect::<Vec<_>>())
            .field("global", &self.global.keys().collect::<Vec<_>>())
            .finish()
    }
}
