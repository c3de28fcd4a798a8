//! Stateful wrapper around one spec document.
//!
//! A [`DocumentSpec`] parses its source at most once and dispatches every
//! [`output`](DocumentSpec::output) call to exactly one render strategy,
//! fixed at construction: the library's built-in renderer, or a renderer
//! plugin resolved by package name.

use std::cell::OnceCell;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use specrel_config::Metadata;

use crate::library::{ParseHandle, RenderError, SpecLibrary};
use crate::plugin::{LoadError, Renderer, RendererLoader};
use crate::probe::FileProbe;

/// Renderer plugin descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererPlugin {
    pub package: String,
    pub args: Vec<String>,
}

impl RendererPlugin {
    pub fn new(package: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            package: package.into(),
            args,
        }
    }
}

/// Error constructing a [`DocumentSpec`].
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("Invalid spec path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("Could not determine whether {} exists", path.display())]
    Existence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Spec does not exist at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Renderer plugin must name a non-empty package")]
    InvalidRendererPlugin,

    /// A renderer plugin was configured but no loader was supplied.
    #[error("Renderer plugin configured without a plugin loader")]
    MissingPluginLoader,

    #[error("Could not load renderer plugin '{package}'")]
    PluginLoad {
        package: String,
        #[source]
        source: LoadError,
    },
}

enum Strategy {
    Builtin,
    Plugin {
        package: String,
        args: Vec<String>,
        renderer: Arc<dyn Renderer>,
    },
}

/// One spec document for one release attempt.
///
/// Not reused across attempts: the memoized parse would go stale.
pub struct DocumentSpec {
    spec_path: PathBuf,
    library: Arc<dyn SpecLibrary>,
    metadata: Option<Metadata>,
    strategy: Strategy,
    parsed: OnceCell<ParseHandle>,
}

impl DocumentSpec {
    /// Start building a document for the absolute path `spec_path`.
    pub fn builder<'a>(
        spec_path: impl Into<PathBuf>,
        library: Arc<dyn SpecLibrary>,
    ) -> SpecBuilder<'a> {
        SpecBuilder {
            spec_path: spec_path.into(),
            library,
            metadata: None,
            renderer_plugin: None,
            loader: None,
        }
    }

    /// Absolute path of the source document.
    pub fn spec_path(&self) -> &Path {
        &self.spec_path
    }

    /// Package of the configured renderer plugin, if any.
    pub fn renderer_package(&self) -> Option<&str> {
        match &self.strategy {
            Strategy::Builtin => None,
            Strategy::Plugin { package, .. } => Some(package),
        }
    }

    /// Parse the document, once.
    ///
    /// The first call invokes the library's parser and stores the outcome,
    /// success or failure. Every later call returns the stored handle.
    pub fn parse(&self) -> &ParseHandle {
        self.parsed.get_or_init(|| {
            tracing::debug!(path = %self.spec_path.display(), "Parsing spec");
            ParseHandle::from(self.library.parse(&self.spec_path))
        })
    }

    /// Produce the rendered artifact.
    ///
    /// Ensures the document is parsed, then runs the render strategy. The
    /// renderer plugin receives `[spec_path, args...]`, the parse handle and
    /// the metadata; the built-in strategy receives the path and metadata.
    /// Rendering is not memoized.
    pub fn output(&self) -> Result<String, RenderError> {
        let parse = self.parse();
        match &self.strategy {
            Strategy::Builtin => self.library.html(&self.spec_path, self.metadata.as_ref()),
            Strategy::Plugin { args, renderer, .. } => {
                let mut full_args = Vec::with_capacity(args.len() + 1);
                full_args.push(self.spec_path.to_string_lossy().into_owned());
                full_args.extend(args.iter().cloned());
                renderer.render(&full_args, parse, self.metadata.as_ref())
            }
        }
    }
}

impl std::fmt::Debug for DocumentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSpec")
            .field("spec_path", &self.spec_path)
            .field("renderer", &self.renderer_package())
            .field("parsed", &self.parsed.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DocumentSpec`].
pub struct SpecBuilder<'a> {
    spec_path: PathBuf,
    library: Arc<dyn SpecLibrary>,
    metadata: Option<Metadata>,
    renderer_plugin: Option<RendererPlugin>,
    loader: Option<&'a dyn RendererLoader>,
}

impl<'a> SpecBuilder<'a> {
    /// Metadata passed through to the renderer verbatim.
    #[must_use]
    pub fn metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Render through a plugin instead of the built-in renderer.
    #[must_use]
    pub fn renderer_plugin(mut self, plugin: Option<RendererPlugin>) -> Self {
        self.renderer_plugin = plugin;
        self
    }

    /// Loader used to resolve the renderer plugin.
    #[must_use]
    pub fn plugin_loader(mut self, loader: &'a dyn RendererLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Validate and construct the document.
    ///
    /// Checks run in order: path shape, existence, renderer plugin.
    pub fn build(self, probe: &dyn FileProbe) -> Result<DocumentSpec, SpecError> {
        check_path(&self.spec_path)?;

        let exists = probe
            .exists(&self.spec_path)
            .map_err(|source| SpecError::Existence {
                path: self.spec_path.clone(),
                source,
            })?;
        if !exists {
            return Err(SpecError::NotFound {
                path: self.spec_path,
            });
        }

        let strategy = match self.renderer_plugin {
            None => Strategy::Builtin,
            Some(plugin) => {
                if plugin.package.trim().is_empty() {
                    return Err(SpecError::InvalidRendererPlugin);
                }
                let loader = self.loader.ok_or(SpecError::MissingPluginLoader)?;
                let renderer =
                    loader
                        .load(&plugin.package)
                        .map_err(|source| SpecError::PluginLoad {
                            package: plugin.package.clone(),
                            source,
                        })?;
                Strategy::Plugin {
                    package: plugin.package,
                    args: plugin.args,
                    renderer,
                }
            }
        };

        Ok(DocumentSpec {
            spec_path: self.spec_path,
            library: self.library,
            metadata: self.metadata,
            strategy,
            parsed: OnceCell::new(),
        })
    }
}

fn check_path(path: &Path) -> Result<(), SpecError> {
    let reason = if path.as_os_str().is_empty() {
        "path is empty"
    } else if path.as_os_str().as_encoded_bytes().contains(&0) {
        "path contains a NUL byte"
    } else if !path.is_absolute() {
        "path is not absolute"
    } else {
        return Ok(());
    };
    Err(SpecError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::library::SpecAst;
    use crate::mock::{MockLibrary, MockProbe, ProbeCall};
    use crate::plugin::PluginLoader;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SPEC: &str = "/repo/spec.md";

    fn probe() -> MockProbe {
        MockProbe::new().with_file(SPEC, "# Spec")
    }

    fn shared(library: &Arc<MockLibrary>) -> Arc<dyn SpecLibrary> {
        Arc::clone(library) as Arc<dyn SpecLibrary>
    }

    fn metadata() -> Metadata {
        json!({ "title": "Protocol" }).as_object().unwrap().clone()
    }

    #[test]
    fn test_parse_is_memoized() {
        let library = Arc::new(MockLibrary::new());
        let spec = DocumentSpec::builder(SPEC, shared(&library))
            .build(&probe())
            .unwrap();

        for _ in 0..5 {
            assert!(spec.parse().ast().is_ok());
        }
        assert_eq!(library.parse_calls(), 1);
    }

    #[test]
    fn test_output_after_parse_does_not_reparse() {
        let library = Arc::new(MockLibrary::new());
        let spec = DocumentSpec::builder(SPEC, shared(&library))
            .build(&probe())
            .unwrap();

        spec.parse();
        spec.output().unwrap();
        spec.output().unwrap();

        assert_eq!(library.parse_calls(), 1);
        assert_eq!(library.html_calls().len(), 2);
    }

    #[test]
    fn test_parse_failure_is_memoized() {
        let library = Arc::new(MockLibrary::new().failing_parse("bad fence"));
        let spec = DocumentSpec::builder(SPEC, shared(&library))
            .build(&probe())
            .unwrap();

        assert!(spec.parse().ast().is_err());
        assert!(spec.parse().ast().is_err());
        assert_eq!(library.parse_calls(), 1);
    }

    #[test]
    fn test_builtin_output() {
        let library = Arc::new(MockLibrary::new().with_html("<p>built-in</p>"));
        let spec = DocumentSpec::builder(SPEC, shared(&library))
            .metadata(Some(metadata()))
            .build(&probe())
            .unwrap();

        assert_eq!(spec.output().unwrap(), "<p>built-in</p>");
        assert_eq!(
            library.html_calls(),
            vec![(PathBuf::from(SPEC), Some(metadata()))]
        );
        assert_eq!(library.parse_calls(), 1);
    }

    #[test]
    fn test_plugin_output() {
        let library = Arc::new(MockLibrary::new());
        let seen: Arc<Mutex<Vec<(Vec<String>, bool, Option<Metadata>)>>> = Arc::default();
        let recorder = Arc::clone(&seen);
        let loader = PluginLoader::new(Vec::new())
            .with_path_lookup(false)
            .with_render_fn("p", move |args, parse, meta| {
                recorder.lock().unwrap().push((
                    args.to_vec(),
                    parse.ast().is_ok(),
                    meta.cloned(),
                ));
                Ok("<p>plugin</p>".to_owned())
            });

        let spec = DocumentSpec::builder(SPEC, shared(&library))
            .metadata(Some(metadata()))
            .renderer_plugin(Some(RendererPlugin::new("p", vec!["a".to_owned()])))
            .plugin_loader(&loader)
            .build(&probe())
            .unwrap();

        assert_eq!(spec.output().unwrap(), "<p>plugin</p>");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(
                vec![SPEC.to_owned(), "a".to_owned()],
                true,
                Some(metadata())
            )]
        );
        assert!(library.html_calls().is_empty());
        assert_eq!(spec.renderer_package(), Some("p"));
    }

    #[test]
    fn test_plugin_receives_parse_handle_unforced() {
        let library = Arc::new(MockLibrary::new().failing_parse("broken"));
        let loader = PluginLoader::new(Vec::new())
            .with_path_lookup(false)
            .with_render_fn("ignore", |_args, _parse, _meta| Ok("<p>ok</p>".to_owned()));

        let spec = DocumentSpec::builder(SPEC, library)
            .renderer_plugin(Some(RendererPlugin::new("ignore", Vec::new())))
            .plugin_loader(&loader)
            .build(&probe())
            .unwrap();

        assert_eq!(spec.output().unwrap(), "<p>ok</p>");
    }

    #[test]
    fn test_not_found_before_parse() {
        let library = Arc::new(MockLibrary::new());
        let err = DocumentSpec::builder("/repo/missing.md", shared(&library))
            .build(&probe())
            .unwrap_err();

        assert!(matches!(err, SpecError::NotFound { .. }));
        assert_eq!(library.parse_calls(), 0);
    }

    #[test]
    fn test_existence_error_keeps_cause() {
        let probe = probe().failing_exists(SPEC);
        let err = DocumentSpec::builder(SPEC, Arc::new(MockLibrary::new()))
            .build(&probe)
            .unwrap_err();
        assert!(matches!(err, SpecError::Existence { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_paths_skip_probe() {
        let probe = probe();
        for path in ["", "relative/spec.md", "/repo/sp\0ec.md"] {
            let err = DocumentSpec::builder(path, Arc::new(MockLibrary::new()))
                .build(&probe)
                .unwrap_err();
            assert!(matches!(err, SpecError::InvalidPath { .. }), "{path:?}");
        }
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_blank_plugin_package() {
        let err = DocumentSpec::builder(SPEC, Arc::new(MockLibrary::new()))
            .renderer_plugin(Some(RendererPlugin::new("  ", Vec::new())))
            .build(&probe())
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidRendererPlugin));
    }

    #[test]
    fn test_plugin_without_loader() {
        let err = DocumentSpec::builder(SPEC, Arc::new(MockLibrary::new()))
            .renderer_plugin(Some(RendererPlugin::new("p", Vec::new())))
            .build(&probe())
            .unwrap_err();
        assert!(matches!(err, SpecError::MissingPluginLoader));
    }

    #[test]
    fn test_plugin_load_failure() {
        let loader = PluginLoader::new(Vec::new()).with_path_lookup(false);
        let probe = probe();
        let err = DocumentSpec::builder(SPEC, Arc::new(MockLibrary::new()))
            .renderer_plugin(Some(RendererPlugin::new("absent", Vec::new())))
            .plugin_loader(&loader)
            .build(&probe)
            .unwrap_err();

        assert!(matches!(err, SpecError::PluginLoad { .. }));
        assert_eq!(probe.calls(), vec![ProbeCall::Exists(PathBuf::from(SPEC))]);
    }

    #[test]
    fn test_parse_handle_shares_ast() {
        let spec = DocumentSpec::builder(SPEC, Arc::new(MockLibrary::new()))
            .build(&probe())
            .unwrap();
        let first: Arc<SpecAst> = spec.parse().outcome().unwrap();
        let second = spec.parse().outcome().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
