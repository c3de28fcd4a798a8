//! Release precondition checks.

use tracing::{error, info};

use crate::context::ReleaseContext;
use crate::error::ReleaseError;
use crate::probe::FileProbe;
use crate::resolve::LibraryResolver;
use specrel_config::{DEFAULT_LIBRARY, ReleaseConfig};

/// Verifies that a release can succeed before any processing starts.
///
/// Checks run in a fixed order and stop at the first failure:
/// 1. the document-processing library resolves
/// 2. `spec_path` is set and not blank
/// 3. the resolved spec path exists
/// 4. a configured renderer plugin names a package
/// 5. `output_path` is set and not blank
///
/// Only the library and existence checks log before failing.
pub struct PreconditionValidator<'a> {
    resolver: &'a dyn LibraryResolver,
    probe: &'a dyn FileProbe,
    library: &'a str,
}

impl<'a> PreconditionValidator<'a> {
    /// Validator checking for the default library.
    pub fn new(resolver: &'a dyn LibraryResolver, probe: &'a dyn FileProbe) -> Self {
        Self {
            resolver,
            probe,
            library: DEFAULT_LIBRARY,
        }
    }

    /// Check for `library` instead of the default.
    #[must_use]
    pub fn with_library(mut self, library: &'a str) -> Self {
        self.library = library;
        self
    }

    /// Run all checks against `config`.
    pub fn validate(
        &self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<(), ReleaseError> {
        info!("Verifying specrel conditions...");

        if let Err(source) = self.resolver.resolve(self.library) {
            error!(library = self.library, "{} was not found.", self.library);
            return Err(ReleaseError::MissingCapability {
                name: self.library.to_owned(),
                source,
            });
        }
        info!(library = self.library, "{} was found, continuing...", self.library);

        let spec_path =
            non_blank(config.spec_path.as_deref()).ok_or(ReleaseError::MissingSourcePath)?;

        let path = ctx.resolve(spec_path);
        match self.probe.exists(&path) {
            Ok(true) => {}
            Ok(false) => {
                error!(
                    path = %path.display(),
                    "Please verify that spec exists and that your specrel configuration is correct."
                );
                return Err(ReleaseError::SourceNotFound { path });
            }
            Err(source) => {
                error!(path = %path.display(), error = %source, "Could not determine spec existence");
                return Err(ReleaseError::UnknownSourceExistence { path, source });
            }
        }

        if let Some(plugin) = &config.renderer_plugin
            && non_blank(plugin.package.as_deref()).is_none()
        {
            return Err(ReleaseError::MissingRendererPackage);
        }

        if non_blank(config.output_path.as_deref()).is_none() {
            return Err(ReleaseError::MissingOutputPath);
        }

        Ok(())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
