//! CLI error types.

use std::error::Error as _;

use specrel_config::ConfigError;
use specrel_core::ReleaseError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Release(#[from] ReleaseError),
}

impl CliError {
    /// One-line report: `Error [CODE]: message: cause: cause`.
    pub(crate) fn report(&self) -> String {
        match self {
            Self::Release(err) => {
                let mut line = format!("Error [{}]: {err}", err.code());
                let mut source = err.source();
                while let Some(cause) = source {
                    line.push_str(": ");
                    line.push_str(&cause.to_string());
                    source = cause.source();
                }
                line
            }
            Self::Config(_) | Self::Io(_) => format!("Error: {self}"),
        }
    }

    /// Long explanation, for release errors.
    pub(crate) fn details(&self) -> Option<String> {
        match self {
            Self::Release(err) => Some(err.details()),
            Self::Config(_) | Self::Io(_) => None,
        }
    }
}
