//! Release error taxonomy.
//!
//! Each variant maps to a stable machine-readable code ([`ReleaseError::code`])
//! and a long human-readable message ([`ReleaseError::details`]). The
//! `Display` form is the short message; wrapped causes stay reachable
//! through [`std::error::Error::source`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::library::{ParseError, RenderError};
use crate::resolve::ResolveError;
use crate::spec::SpecError;

/// Error raised by a release lifecycle stage.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// Document-processing library not found locally or globally.
    #[error("Missing {name}")]
    MissingCapability {
        name: String,
        #[source]
        source: ResolveError,
    },

    #[error("Missing spec_path")]
    MissingSourcePath,

    /// Existence check for the spec itself failed.
    #[error("Error determining spec existence")]
    UnknownSourceExistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Spec does not exist")]
    SourceNotFound { path: PathBuf },

    #[error("Missing plugin package")]
    MissingRendererPackage,

    #[error("Missing output path")]
    MissingOutputPath,

    /// Existence check for the output directory failed.
    #[error("Error determining output existence")]
    UnknownOutputExistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Spec failed to parse")]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: Arc<ParseError>,
    },

    #[error("Spec is empty")]
    EmptyAst { path: PathBuf },

    #[error("Error rendering spec")]
    RenderFailure {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Renderer plugin could not be provided.
    #[error("Renderer plugin unavailable")]
    RendererUnavailable(#[source] SpecError),

    /// Document could not be set up for any other reason.
    #[error("Invalid spec")]
    InvalidSpec(#[source] SpecError),

    /// Render produced nothing, or nothing was prepared before publishing.
    #[error("Missing output")]
    EmptyOutput,

    #[error("Error writing output")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReleaseError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCapability { .. } => "E_MISSING_SPEC_MD",
            Self::MissingSourcePath => "E_MISSING_SPEC_PATH",
            Self::UnknownSourceExistence { .. } => "E_DET_SPEC_EXISTS",
            Self::SourceNotFound { .. } => "E_MISSING_SPEC",
            Self::MissingRendererPackage => "E_MISSING_PLUGIN_PACKAGE",
            Self::MissingOutputPath => "E_MISSING_OUTPUT_PATH",
            Self::UnknownOutputExistence { .. } => "E_DET_OUTPUT_EXISTS",
            Self::ParseFailure { .. } => "E_SPEC_PARSE_ERROR",
            Self::EmptyAst { .. } => "E_AST_EMPTY",
            Self::RenderFailure { .. } => "E_OUTPUT_ERROR",
            Self::RendererUnavailable(_) => "E_PLUGIN_LOAD",
            Self::InvalidSpec(_) => "E_INVALID_SPEC",
            Self::EmptyOutput => "E_MISSING_OUTPUT",
            Self::OutputWriteFailure { .. } => "E_OUTPUT_WRITE_ERROR",
        }
    }

    /// Long human-readable explanation.
    pub fn details(&self) -> String {
        match self {
            Self::MissingCapability { name, .. } => format!(
                "Attempted to find {name} as a local dependency and as a global install and failed."
            ),
            Self::MissingSourcePath => {
                "Must provide a `spec_path` string in your specrel configuration!".to_owned()
            }
            Self::UnknownSourceExistence { path, .. } => format!(
                "There was an error verifying spec existence at {}",
                path.display()
            ),
            Self::SourceNotFound { path } => {
                format!("The spec at {} does not exist", path.display())
            }
            Self::MissingRendererPackage => {
                "Please supply a renderer_plugin.package to load if using a plugin".to_owned()
            }
            Self::MissingOutputPath => "Please supply an output path".to_owned(),
            Self::UnknownOutputExistence { path, .. } => format!(
                "There was an error verifying output directory existence at {}",
                path.display()
            ),
            Self::ParseFailure { path, .. } => {
                format!("The spec at {} could not be parsed", path.display())
            }
            Self::EmptyAst { path } => {
                format!("The spec at {} has no content", path.display())
            }
            Self::RenderFailure { path, .. } => {
                format!("There was an error rendering the spec at {}", path.display())
            }
            Self::RendererUnavailable(_) => {
                "The configured renderer plugin could not be loaded".to_owned()
            }
            Self::InvalidSpec(_) => "The spec could not be set up for processing".to_owned(),
            Self::EmptyOutput => "Rendering the spec produced no output".to_owned(),
            Self::OutputWriteFailure { path, .. } => {
                format!("There was an error writing output to {}", path.display())
            }
        }
    }
}

impl From<SpecError> for ReleaseError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::NotFound { path } => Self::SourceNotFound { path },
            SpecError::Existence { path, source } => Self::UnknownSourceExistence { path, source },
            SpecError::InvalidRendererPlugin => Self::MissingRendererPackage,
            err @ (SpecError::MissingPluginLoader | SpecError::PluginLoad { .. }) => {
                Self::RendererUnavailable(err)
            }
            err @ SpecError::InvalidPath { .. } => Self::InvalidSpec(err),
        }
    }
}
