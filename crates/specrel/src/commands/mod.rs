//! CLI command implementations.

mod build;
mod check;
mod verify;

use std::path::PathBuf;

use clap::Args;
use specrel_config::{CliSettings, Config};
use specrel_core::{ReleaseConfig, ReleaseContext, SpecRelease};

pub(crate) use build::build;
pub(crate) use check::check;
pub(crate) use verify::verify;

use crate::error::CliError;
use crate::output::Output;

/// Arguments shared by every release command.
#[derive(Args)]
pub(crate) struct ReleaseArgs {
    /// Path to configuration file (default: auto-discover specrel.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spec document path (overrides config).
    #[arg(short, long, env = "SPECREL_SPEC")]
    spec: Option<String>,

    /// Output file or directory (overrides config).
    #[arg(short, long, env = "SPECREL_OUTPUT")]
    output: Option<String>,

    /// Renderer plugin package (overrides config).
    #[arg(long)]
    plugin: Option<String>,

    /// Working directory paths are resolved against (default: current directory).
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Everything a command needs to drive the release stages.
pub(crate) struct ReleaseRun {
    pub(crate) release: SpecRelease,
    pub(crate) config: ReleaseConfig,
    pub(crate) ctx: ReleaseContext,
}

impl ReleaseArgs {
    /// Load configuration and set up the release.
    fn load(&self, output: &Output) -> Result<ReleaseRun, CliError> {
        let current = std::env::current_dir()?;
        let cwd = match &self.cwd {
            Some(dir) => current.join(dir),
            None => current.clone(),
        };
        let config_path = self.config.as_ref().map(|path| current.join(path));

        let cli_settings = CliSettings {
            spec_path: self.spec.clone(),
            output_path: self.output.clone(),
            plugin_package: self.plugin.clone(),
        };
        let config = Config::load_in(&cwd, config_path.as_deref(), Some(&cli_settings))?;

        tracing::debug!(
            cwd = %cwd.display(),
            library = %config.library_resolved.name,
            "Loaded configuration"
        );
        match &config.config_path {
            Some(path) => output.info(&format!("Config: {}", path.display())),
            None => output.warning("No specrel.toml found, using defaults"),
        }

        let release = SpecRelease::builtin(config.library_resolved.plugin_dirs.clone())
            .with_library(config.library_resolved.name.clone());

        Ok(ReleaseRun {
            release,
            config: config.release_config(),
            ctx: ReleaseContext::new(cwd),
        })
    }
}
