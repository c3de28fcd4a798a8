//! Release lifecycle stages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use specrel_config::{DEFAULT_LIBRARY, ReleaseConfig};
use tracing::{error, info};

use crate::context::ReleaseContext;
use crate::error::ReleaseError;
use crate::plugin::{PluginLoader, RendererLoader};
use crate::probe::{FileProbe, FsProbe};
use crate::resolve::{LibraryRegistry, LibraryResolver};
use crate::spec::{DocumentSpec, RendererPlugin};
use crate::validator::{PreconditionValidator, non_blank};

/// Stateful release plugin, one per release attempt.
///
/// The orchestrator calls the stages in order:
/// [`verify_conditions`](Self::verify_conditions),
/// [`verify_release`](Self::verify_release), [`prepare`](Self::prepare),
/// [`publish`](Self::publish). The first stage that processes the spec
/// builds its [`DocumentSpec`] and later stages reuse it, so the spec is
/// parsed once per attempt. The rendered artifact is kept between
/// `prepare` and `publish`.
pub struct SpecRelease {
    resolver: Arc<dyn LibraryResolver>,
    loader: Arc<dyn RendererLoader>,
    probe: Arc<dyn FileProbe>,
    library: String,
    spec: Option<DocumentSpec>,
    output: Option<String>,
}

impl SpecRelease {
    pub fn new(
        resolver: Arc<dyn LibraryResolver>,
        loader: Arc<dyn RendererLoader>,
        probe: Arc<dyn FileProbe>,
    ) -> Self {
        Self {
            resolver,
            loader,
            probe,
            library: DEFAULT_LIBRARY.to_owned(),
            spec: None,
            output: None,
        }
    }

    /// Release using the built-in library, the real filesystem and
    /// renderer plugins from `plugin_dirs` or `PATH`.
    #[must_use]
    pub fn builtin(plugin_dirs: Vec<PathBuf>) -> Self {
        Self::new(
            Arc::new(LibraryRegistry::builtin()),
            Arc::new(PluginLoader::new(plugin_dirs)),
            Arc::new(FsProbe),
        )
    }

    /// Use the library registered as `name`.
    #[must_use]
    pub fn with_library(mut self, name: impl Into<String>) -> Self {
        self.library = name.into();
        self
    }

    /// Artifact kept by [`prepare`](Self::prepare), if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Check release preconditions.
    pub fn verify_conditions(
        &self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<(), ReleaseError> {
        PreconditionValidator::new(self.resolver.as_ref(), self.probe.as_ref())
            .with_library(&self.library)
            .validate(config, ctx)
    }

    /// Parse the spec and reject unparsable or empty documents.
    pub fn verify_release(
        &mut self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<(), ReleaseError> {
        let spec = self.document(config, ctx)?;
        match spec.parse().outcome() {
            Err(source) => {
                error!(path = %spec.spec_path().display(), error = %source, "Spec failed to parse");
                Err(ReleaseError::ParseFailure {
                    path: spec.spec_path().to_path_buf(),
                    source,
                })
            }
            Ok(ast) if ast.is_empty() => Err(ReleaseError::EmptyAst {
                path: spec.spec_path().to_path_buf(),
            }),
            Ok(ast) => {
                info!(
                    path = %spec.spec_path().display(),
                    headings = ast.headings.len(),
                    "Spec parsed"
                );
                Ok(())
            }
        }
    }

    /// Render the spec and keep the artifact for [`publish`](Self::publish).
    pub fn prepare(
        &mut self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<(), ReleaseError> {
        let spec = self.document(config, ctx)?;
        let output = spec.output().map_err(|source| {
            error!(path = %spec.spec_path().display(), error = %source, "Error rendering spec");
            ReleaseError::RenderFailure {
                path: spec.spec_path().to_path_buf(),
                source,
            }
        })?;
        if output.trim().is_empty() {
            return Err(ReleaseError::EmptyOutput);
        }
        info!(
            path = %spec.spec_path().display(),
            renderer = spec.renderer_package().unwrap_or("built-in"),
            bytes = output.len(),
            "Spec rendered"
        );

        self.output = Some(output);
        Ok(())
    }

    /// Write the prepared artifact and return its path.
    ///
    /// An output path with an extension names the file; otherwise it names
    /// a directory and the file is `<spec stem>.html` inside it. Missing
    /// directories are created.
    pub fn publish(
        &self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<PathBuf, ReleaseError> {
        let output = self.output.as_deref().ok_or(ReleaseError::EmptyOutput)?;
        let output_path =
            non_blank(config.output_path.as_deref()).ok_or(ReleaseError::MissingOutputPath)?;
        let spec_path =
            non_blank(config.spec_path.as_deref()).ok_or(ReleaseError::MissingSourcePath)?;

        let (dir, file) = output_target(&ctx.resolve(output_path), Path::new(spec_path));

        let dir_exists = self
            .probe
            .exists(&dir)
            .map_err(|source| ReleaseError::UnknownOutputExistence {
                path: dir.clone(),
                source,
            })?;
        if !dir_exists {
            self.probe
                .create_dir_all(&dir)
                .map_err(|source| ReleaseError::OutputWriteFailure {
                    path: dir.clone(),
                    source,
                })?;
        }

        self.probe
            .write(&file, output.as_bytes())
            .map_err(|source| ReleaseError::OutputWriteFailure {
                path: file.clone(),
                source,
            })?;

        info!(path = %file.display(), "Spec published");
        Ok(file)
    }

    /// Document for this attempt, built on first use.
    fn document(
        &mut self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<&DocumentSpec, ReleaseError> {
        let spec = match self.spec.take() {
            Some(spec) => spec,
            None => self.build_document(config, ctx)?,
        };
        Ok(self.spec.insert(spec))
    }

    fn build_document(
        &self,
        config: &ReleaseConfig,
        ctx: &ReleaseContext,
    ) -> Result<DocumentSpec, ReleaseError> {
        let library =
            self.resolver
                .resolve(&self.library)
                .map_err(|source| ReleaseError::MissingCapability {
                    name: self.library.clone(),
                    source,
                })?;
        let spec_path =
            non_blank(config.spec_path.as_deref()).ok_or(ReleaseError::MissingSourcePath)?;
        let plugin = config.renderer_plugin.as_ref().map(|plugin| {
            RendererPlugin::new(plugin.package.clone().unwrap_or_default(), plugin.args.clone())
        });

        DocumentSpec::builder(ctx.resolve(spec_path), library)
            .metadata(config.metadata.clone())
            .renderer_plugin(plugin)
            .plugin_loader(self.loader.as_ref())
            .build(self.probe.as_ref())
            .map_err(ReleaseError::from)
    }
}

impl std::fmt::Debug for SpecRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecRelease")
            .field("library", &self.library)
            .field("spec", &self.spec)
            .field("prepared", &self.output.is_some())
            .finish_non_exhaustive()
    }
}

/// Resolve the output directory and file for `target`.
fn output_target(target: &Path, spec_path: &Path) -> (PathBuf, PathBuf) {
    if target.extension().is_some() {
        let dir = target.parent().map(Path::to_path_buf).unwrap_or_default();
        return (dir, target.to_path_buf());
    }
    let stem = spec_path
        .file_stem()
        .map_or_else(|| "spec".into(), |s| s.to_string_lossy());
    (target.to_path_buf(), target.join(format!("{stem}.html")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::SpecLibrary;
    use crate::mock::{MockLibrary, MockProbe, ProbeCall};
    use pretty_assertions::assert_eq;
    use specrel_config::RendererPluginConfig;

    fn release(library: MockLibrary, probe: &Arc<MockProbe>) -> SpecRelease {
        shared_release(&Arc::new(library), probe)
    }

    fn shared_release(library: &Arc<MockLibrary>, probe: &Arc<MockProbe>) -> SpecRelease {
        let registry = LibraryRegistry::new()
            .with_local(DEFAULT_LIBRARY, Arc::clone(library) as Arc<dyn SpecLibrary>);
        let loader = PluginLoader::new(Vec::new())
            .with_path_lookup(false)
            .with_render_fn("blank", |_args, _parse, _meta| Ok("  \n".to_owned()))
            .with_render_fn("args", |args, _parse, _meta| Ok(args.join(" ")));
        SpecRelease::new(
            Arc::new(registry),
            Arc::new(loader),
            Arc::clone(probe) as Arc<dyn FileProbe>,
        )
    }

    fn probe() -> Arc<MockProbe> {
        Arc::new(MockProbe::new().with_file("/repo/spec.md", "# Spec"))
    }

    fn ctx() -> ReleaseContext {
        ReleaseContext::new("/repo")
    }

    fn config(output_path: &str) -> ReleaseConfig {
        ReleaseConfig {
            spec_path: Some("spec.md".to_owned()),
            output_path: Some(output_path.to_owned()),
            ..ReleaseConfig::default()
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let probe = probe();
        let mut release = release(MockLibrary::new().with_html("<h1>Spec</h1>"), &probe);
        let config = config("dist");

        release.verify_conditions(&config, &ctx()).unwrap();
        release.verify_release(&config, &ctx()).unwrap();
        release.prepare(&config, &ctx()).unwrap();
        let written = release.publish(&config, &ctx()).unwrap();

        assert_eq!(written, PathBuf::from("/repo/dist/spec.html"));
        assert_eq!(probe.written(&written).as_deref(), Some("<h1>Spec</h1>"));
        assert!(
            probe
                .calls()
                .contains(&ProbeCall::CreateDirAll(PathBuf::from("/repo/dist")))
        );
    }

    #[test]
    fn test_one_parse_per_attempt() {
        let probe = probe();
        let library = Arc::new(MockLibrary::new());
        let mut release = shared_release(&library, &probe);
        let config = config("dist");

        release.verify_release(&config, &ctx()).unwrap();
        release.prepare(&config, &ctx()).unwrap();
        release.publish(&config, &ctx()).unwrap();

        assert_eq!(library.parse_calls(), 1);
        assert_eq!(library.html_calls().len(), 1);
        assert_eq!(
            probe
                .calls()
                .iter()
                .filter(|call| **call == ProbeCall::Exists(PathBuf::from("/repo/spec.md")))
                .count(),
            1
        );
    }

    #[test]
    fn test_plugin_reuses_verified_parse() {
        let probe = probe();
        let library = Arc::new(MockLibrary::new());
        let mut release = shared_release(&library, &probe);
        let config = ReleaseConfig {
            renderer_plugin: Some(RendererPluginConfig::new("args", Vec::new())),
            ..config("out.txt")
        };

        release.verify_release(&config, &ctx()).unwrap();
        release.prepare(&config, &ctx()).unwrap();

        assert_eq!(release.output(), Some("/repo/spec.md"));
        assert_eq!(library.parse_calls(), 1);
    }

    #[test]
    fn test_verify_release_parse_failure() {
        let probe = probe();
        let mut release = release(MockLibrary::new().failing_parse("bad"), &probe);
        let err = release.verify_release(&config("dist"), &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_SPEC_PARSE_ERROR");
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "Invalid spec: bad"
        );
    }

    #[test]
    fn test_verify_release_empty_ast() {
        let probe = probe();
        let mut release = release(MockLibrary::new().with_empty_ast(), &probe);
        let err = release.verify_release(&config("dist"), &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_AST_EMPTY");
    }

    #[test]
    fn test_verify_release_missing_spec() {
        let probe = Arc::new(MockProbe::new());
        let mut release = release(MockLibrary::new(), &probe);
        let err = release.verify_release(&config("dist"), &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_MISSING_SPEC");
    }

    #[test]
    fn test_prepare_render_failure() {
        let probe = probe();
        let mut release = release(MockLibrary::new().failing_html("no template"), &probe);
        let err = release.prepare(&config("dist"), &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_OUTPUT_ERROR");
        assert!(release.output().is_none());
    }

    #[test]
    fn test_prepare_blank_output() {
        let probe = probe();
        let mut release = release(MockLibrary::new(), &probe);
        let config = ReleaseConfig {
            renderer_plugin: Some(RendererPluginConfig::new("blank", Vec::new())),
            ..config("dist")
        };
        let err = release.prepare(&config, &ctx()).unwrap_err();
        assert!(matches!(err, ReleaseError::EmptyOutput));
    }

    #[test]
    fn test_prepare_with_plugin() {
        let probe = probe();
        let mut release = release(MockLibrary::new(), &probe);
        let config = ReleaseConfig {
            renderer_plugin: Some(RendererPluginConfig::new("args", vec!["--toc".to_owned()])),
            ..config("dist")
        };
        release.prepare(&config, &ctx()).unwrap();
        assert_eq!(release.output(), Some("/repo/spec.md --toc"));
    }

    #[test]
    fn test_prepare_unknown_plugin() {
        let probe = probe();
        let mut release = release(MockLibrary::new(), &probe);
        let config = ReleaseConfig {
            renderer_plugin: Some(RendererPluginConfig::new("absent", Vec::new())),
            ..config("dist")
        };
        let err = release.prepare(&config, &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_PLUGIN_LOAD");
    }

    #[test]
    fn test_prepare_blank_plugin_package() {
        let probe = probe();
        let mut release = release(MockLibrary::new(), &probe);
        let config = ReleaseConfig {
            renderer_plugin: Some(RendererPluginConfig::new(" ", Vec::new())),
            ..config("dist")
        };
        let err = release.prepare(&config, &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_MISSING_PLUGIN_PACKAGE");
    }

    #[test]
    fn test_publish_without_prepare() {
        let probe = probe();
        let release = release(MockLibrary::new(), &probe);
        let err = release.publish(&config("dist"), &ctx()).unwrap_err();
        assert!(matches!(err, ReleaseError::EmptyOutput));
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_publish_to_file_path() {
        let probe = Arc::new(
            MockProbe::new()
                .with_file("/repo/spec.md", "# Spec")
                .with_dir("/repo/site"),
        );
        let mut release = release(MockLibrary::new(), &probe);
        let config = config("site/index.html");

        release.prepare(&config, &ctx()).unwrap();
        let written = release.publish(&config, &ctx()).unwrap();

        assert_eq!(written, PathBuf::from("/repo/site/index.html"));
        assert!(
            !probe
                .calls()
                .iter()
                .any(|call| matches!(call, ProbeCall::CreateDirAll(_)))
        );
    }

    #[test]
    fn test_publish_existence_failure() {
        let probe = Arc::new(
            MockProbe::new()
                .with_file("/repo/spec.md", "# Spec")
                .failing_exists("/repo/dist"),
        );
        let mut release = release(MockLibrary::new(), &probe);
        release.prepare(&config("dist"), &ctx()).unwrap();
        let err = release.publish(&config("dist"), &ctx()).unwrap_err();
        assert_eq!(err.code(), "E_DET_OUTPUT_EXISTS");
    }

    #[test]
    fn test_publish_write_failure() {
        let probe = Arc::new(
            MockProbe::new()
                .with_file("/repo/spec.md", "# Spec")
                .failing_write(),
        );
        let mut release = release(MockLibrary::new(), &probe);
        release.prepare(&config("dist"), &ctx()).unwrap();
        let err = release.publish(&config("dist"), &ctx()).unwrap_err();
        assert!(
            matches!(err, ReleaseError::OutputWriteFailure { ref path, .. } if path == &PathBuf::from("/repo/dist"))
        );
    }

    #[test]
    fn test_output_target() {
        let spec = Path::new("docs/protocol.md");
        assert_eq!(
            output_target(Path::new("/out"), spec),
            (PathBuf::from("/out"), PathBuf::from("/out/protocol.html"))
        );
        assert_eq!(
            output_target(Path::new("/out/index.htm"), spec),
            (PathBuf::from("/out"), PathBuf::from("/out/index.htm"))
        );
    }
}
