//! Renderer plugins and the loader that finds them by package name.
//!
//! A renderer replaces the built-in HTML render strategy. Packages are
//! looked up in-process first, then as executables in the configured
//! plugin directories, then on `PATH`.

use std::collections::HashMap;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use serde::Serialize;
use specrel_config::Metadata;

use crate::library::{ParseHandle, RenderError, SpecAst};

/// Pluggable render strategy.
///
/// `args` is the configured argument list with the spec path prepended.
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        args: &[String],
        parse: &ParseHandle,
        metadata: Option<&Metadata>,
    ) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&[String], &ParseHandle, Option<&Metadata>) -> Result<String, RenderError>
        + Send
        + Sync,
{
    fn render(
        &self,
        args: &[String],
        parse: &ParseHandle,
        metadata: Option<&Metadata>,
    ) -> Result<String, RenderError> {
        self(args, parse, metadata)
    }
}

/// Error returned when a renderer package cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Renderer plugin '{package}' was not found locally or globally")]
    NotFound { package: String },
    #[error("Invalid renderer plugin name '{package}'")]
    InvalidName { package: String },
}

/// Loads renderer plugins by package name.
pub trait RendererLoader: Send + Sync {
    fn load(&self, package: &str) -> Result<Arc<dyn Renderer>, LoadError>;
}

/// Default [`RendererLoader`].
///
/// Resolution order:
/// 1. renderers registered in-process
/// 2. executables named `package` in the plugin directories
/// 3. executables named `package` on `PATH`, unless disabled
pub struct PluginLoader {
    renderers: HashMap<String, Arc<dyn Renderer>>,
    search_dirs: Vec<PathBuf>,
    path_lookup: bool,
}

impl PluginLoader {
    /// Create a loader searching `search_dirs` and then `PATH`.
    #[must_use]
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            renderers: HashMap::new(),
            search_dirs,
            path_lookup: true,
        }
    }

    /// Register an in-process renderer.
    #[must_use]
    pub fn with_renderer(mut self, package: impl Into<String>, renderer: Arc<dyn Renderer>) -> Self {
        self.renderers.insert(package.into(), renderer);
        self
    }

    /// Register an in-process renderer function.
    #[must_use]
    pub fn with_render_fn<F>(self, package: impl Into<String>, render: F) -> Self
    where
        F: Fn(&[String], &ParseHandle, Option<&Metadata>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.with_renderer(package, Arc::new(render))
    }

    /// Enable or disable the `PATH` fallback.
    #[must_use]
    pub fn with_path_lookup(mut self, enabled: bool) -> Self {
        self.path_lookup = enabled;
        self
    }

    fn find_executable(&self, package: &str) -> Option<PathBuf> {
        if let Some(found) = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(package))
            .find(|candidate| is_executable(candidate))
        {
            return Some(found);
        }
        if !self.path_lookup {
            return None;
        }
        tracing::debug!(package, "Renderer plugin not found locally, checking PATH");
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(package))
            .find(|candidate| is_executable(candidate))
    }
}

impl RendererLoader for PluginLoader {
    fn load(&self, package: &str) -> Result<Arc<dyn Renderer>, LoadError> {
        if let Some(renderer) = self.renderers.get(package) {
            return Ok(Arc::clone(renderer));
        }
        if package.is_empty()
            || package.contains(['/', '\\'])
            || package == "."
            || package == ".."
        {
            return Err(LoadError::InvalidName {
                package: package.to_owned(),
            });
        }
        let program = self
            .find_executable(package)
            .ok_or_else(|| LoadError::NotFound {
                package: package.to_owned(),
            })?;
        tracing::debug!(package, program = %program.display(), "Loaded renderer plugin");
        Ok(Arc::new(CommandRenderer::new(program)))
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .field("search_dirs", &self.search_dirs)
            .field("path_lookup", &self.path_lookup)
            .finish()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// JSON document written to an executable renderer's stdin.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderInput<'a> {
    ast: Option<&'a SpecAst>,
    parse_error: Option<String>,
    metadata: Option<&'a Metadata>,
}

/// Renderer backed by an external executable.
///
/// The executable receives the render args on its command line and a
/// JSON document `{"ast", "parseError", "metadata"}` on stdin. Its stdout
/// is the rendered output; a non-zero exit status is an error.
#[derive(Debug)]
pub struct CommandRenderer {
    program: PathBuf,
}

impl CommandRenderer {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Renderer for CommandRenderer {
    fn render(
        &self,
        args: &[String],
        parse: &ParseHandle,
        metadata: Option<&Metadata>,
    ) -> Result<String, RenderError> {
        let started_at = Instant::now();
        let (ast, parse_error) = match parse.ast() {
            Ok(ast) => (Some(ast), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let payload = serde_json::to_vec(&RenderInput {
            ast,
            parse_error,
            metadata,
        })
        .map_err(RenderError::Encode)?;

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                tracing::warn!(
                    program = %self.program.display(),
                    error = %source,
                    "Failed to spawn renderer plugin"
                );
                RenderError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        // Stdin is written on its own thread while stdout is drained here.
        let stdin = child.stdin.take();
        let writer = std::thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        });

        let output = child.wait_with_output();
        let input = join_writer(writer);
        let output = output.map_err(RenderError::Io)?;
        input?;

        if !output.status.success() {
            let exit_code = output.status.code();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            tracing::warn!(
                program = %self.program.display(),
                exit_code = exit_code.unwrap_or(-1),
                elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
                stderr = %stderr,
                "Renderer plugin failed"
            );
            return Err(RenderError::Command { exit_code, stderr });
        }

        tracing::debug!(
            program = %self.program.display(),
            bytes = output.stdout.len(),
            elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Renderer plugin finished"
        );
        String::from_utf8(output.stdout).map_err(RenderError::Utf8)
    }
}

/// Wait for the stdin writer. A plugin may exit without reading its input.
fn join_writer(writer: JoinHandle<io::Result<()>>) -> Result<(), RenderError> {
    match writer.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(err)) => Err(RenderError::Io(err)),
        Err(_) => Err(RenderError::Other("renderer input writer panicked".to_owned())),
    }
}
