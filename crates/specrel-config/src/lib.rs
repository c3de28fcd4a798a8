//! Configuration management for specrel.
//!
//! Parses `specrel.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `spec_path`
//! - `output_path`
//! - `renderer_plugin.package`
//! - `renderer_plugin.args`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Opaque document metadata, passed through to renderers verbatim.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Name of the document-processing library probed before a release.
pub const DEFAULT_LIBRARY: &str = "spec-md";

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "specrel.toml";

/// Default directory (relative to the config file) searched for renderer plugins.
const DEFAULT_PLUGIN_DIR: &str = ".specrel/plugins";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source document path.
    pub spec_path: Option<String>,
    /// Override output path.
    pub output_path: Option<String>,
    /// Override renderer plugin package.
    pub plugin_package: Option<String>,
}

/// Renderer plugin descriptor.
///
/// `package` stays optional so that a configured-but-unnamed plugin can be
/// reported precisely instead of failing at parse time.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererPluginConfig {
    /// Package (plugin) name to load.
    pub package: Option<String>,
    /// Extra arguments passed after the spec path.
    pub args: Vec<String>,
}

impl RendererPluginConfig {
    /// Create a descriptor for the named package.
    #[must_use]
    pub fn new(package: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            package: Some(package.into()),
            args,
        }
    }
}

/// Per-release plugin configuration consumed by the release lifecycle.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Source document path, relative to the working directory.
    pub spec_path: Option<String>,
    /// Destination of the rendered artifact.
    pub output_path: Option<String>,
    /// Optional renderer plugin replacing the built-in HTML renderer.
    pub renderer_plugin: Option<RendererPluginConfig>,
    /// Metadata handed to the renderer.
    pub metadata: Option<Metadata>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source document path.
    pub spec_path: Option<String>,
    /// Output path.
    pub output_path: Option<String>,
    /// Renderer plugin section.
    pub renderer_plugin: Option<RendererPluginConfig>,
    /// Metadata section.
    pub metadata: Option<Metadata>,
    /// Library configuration (paths are relative strings from TOML).
    library: LibraryConfigRaw,

    /// Resolved library configuration (set after loading).
    #[serde(skip)]
    pub library_resolved: LibraryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw library configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LibraryConfigRaw {
    name: Option<String>,
    plugin_dirs: Option<Vec<String>>,
}

/// Resolved library configuration with absolute paths.
#[derive(Debug, Default)]
pub struct LibraryConfig {
    /// Document-processing library name to probe.
    pub name: String,
    /// Directories searched for executable renderer plugins before `PATH`.
    pub plugin_dirs: Vec<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`renderer_plugin.package`").
        field: String,
        /// Error message (e.g., "${`SPEC_RENDERER`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `specrel.toml` in `start_dir` and its parents,
    /// falling back to defaults rooted at `start_dir`.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load_in(
        start_dir: &Path,
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config(start_dir) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_base(start_dir)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Plugin configuration for the release lifecycle.
    #[must_use]
    pub fn release_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            spec_path: self.spec_path.clone(),
            output_path: self.output_path.clone(),
            renderer_plugin: self.renderer_plugin.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(spec_path) = &settings.spec_path {
            self.spec_path = Some(spec_path.clone());
        }
        if let Some(output_path) = &settings.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(package) = &settings.plugin_package {
            match &mut self.renderer_plugin {
                Some(plugin) => plugin.package = Some(package.clone()),
                None => {
                    self.renderer_plugin = Some(RendererPluginConfig::new(package.clone(), Vec::new()));
                }
            }
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            spec_path: None,
            output_path: None,
            renderer_plugin: None,
            metadata: None,
            library: LibraryConfigRaw::default(),
            library_resolved: LibraryConfig {
                name: DEFAULT_LIBRARY.to_owned(),
                plugin_dirs: vec![base.join(DEFAULT_PLUGIN_DIR)],
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Only structural concerns are checked here. Release preconditions
    /// (spec and output paths, plugin package) are checked by the release
    /// validator so that they surface with their own error codes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library_resolved.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "library.name cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.spec_path, "spec_path")?;
        expand::expand_opt(&mut self.output_path, "output_path")?;

        if let Some(ref mut plugin) = self.renderer_plugin {
            expand::expand_opt(&mut plugin.package, "renderer_plugin.package")?;
            for arg in &mut plugin.args {
                *arg = expand::expand_env(arg, "renderer_plugin.args")?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let plugin_dirs = match &self.library.plugin_dirs {
            Some(dirs) => dirs.iter().map(|d| config_dir.join(d)).collect(),
            None => vec![config_dir.join(DEFAULT_PLUGIN_DIR)],
        };

        self.library_resolved = LibraryConfig {
            name: self
                .library
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_LIBRARY.to_owned()),
            plugin_dirs,
        };
    }
}
