//! In-memory test doubles for the filesystem probe and the library.
//!
//! Compiled for tests and behind the `mock` feature.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use specrel_config::Metadata;

use crate::library::{ParseError, RenderError, SpecAst, SpecLibrary};
use crate::probe::FileProbe;

/// One recorded [`MockProbe`] operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeCall {
    Exists(PathBuf),
    CreateDirAll(PathBuf),
    Write(PathBuf),
}

/// In-memory [`FileProbe`] with failure injection and a call log.
///
/// # Example
///
/// ```ignore
/// let probe = MockProbe::new().with_file("/repo/spec.md", "# Spec");
/// assert!(probe.exists(Path::new("/repo/spec.md")).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MockProbe {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<HashSet<PathBuf>>,
    failing_exists: HashSet<PathBuf>,
    failing_write: bool,
    calls: Mutex<Vec<ProbeCall>>,
}

impl MockProbe {
    /// Create an empty probe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.into());
        self
    }

    /// Add a directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Make existence checks of `path` fail with an I/O error.
    #[must_use]
    pub fn failing_exists(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_exists.insert(path.into());
        self
    }

    /// Make every write and directory creation fail.
    #[must_use]
    pub fn failing_write(mut self) -> Self {
        self.failing_write = true;
        self
    }

    /// Operations performed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Contents written to `path`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn written(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn record(&self, call: ProbeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl FileProbe for MockProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.record(ProbeCall::Exists(path.to_path_buf()));
        if self.failing_exists.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock existence failure",
            ));
        }
        Ok(self.files.read().unwrap().contains_key(path) || self.dirs.read().unwrap().contains(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(ProbeCall::CreateDirAll(path.to_path_buf()));
        if self.failing_write {
            return Err(io::Error::other("mock mkdir failure"));
        }
        let mut dirs = self.dirs.write().unwrap();
        for ancestor in path.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.record(ProbeCall::Write(path.to_path_buf()));
        if self.failing_write {
            return Err(io::Error::other("mock write failure"));
        }
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

/// Counting [`SpecLibrary`] returning canned results.
#[derive(Debug)]
pub struct MockLibrary {
    ast: SpecAst,
    html: String,
    parse_failure: Option<String>,
    html_failure: Option<String>,
    parse_calls: AtomicUsize,
    html_calls: Mutex<Vec<(PathBuf, Option<Metadata>)>>,
}

impl Default for MockLibrary {
    fn default() -> Self {
        Self {
            ast: SpecAst {
                title: Some("Spec".to_owned()),
                headings: Vec::new(),
                blocks: 1,
                source: "# Spec".to_owned(),
            },
            html: "<h1>Spec</h1>".to_owned(),
            parse_failure: None,
            html_failure: None,
            parse_calls: AtomicUsize::new(0),
            html_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockLibrary {
    /// Library that parses to a one-block document and renders `<h1>Spec</h1>`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `html` from every render.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Return a document with no blocks from every parse.
    #[must_use]
    pub fn with_empty_ast(mut self) -> Self {
        self.ast.blocks = 0;
        self.ast.title = None;
        self.ast.source.clear();
        self
    }

    /// Fail every parse with `message`.
    #[must_use]
    pub fn failing_parse(mut self, message: impl Into<String>) -> Self {
        self.parse_failure = Some(message.into());
        self
    }

    /// Fail every render with `message`.
    #[must_use]
    pub fn failing_html(mut self, message: impl Into<String>) -> Self {
        self.html_failure = Some(message.into());
        self
    }

    /// Number of parse calls so far.
    pub fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    /// Arguments of every render call so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn html_calls(&self) -> Vec<(PathBuf, Option<Metadata>)> {
        self.html_calls.lock().unwrap().clone()
    }
}

impl SpecLibrary for MockLibrary {
    fn parse(&self, _path: &Path) -> Result<SpecAst, ParseError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        match &self.parse_failure {
            Some(message) => Err(ParseError::Invalid(message.clone())),
            None => Ok(self.ast.clone()),
        }
    }

    fn html(&self, path: &Path, metadata: Option<&Metadata>) -> Result<String, RenderError> {
        self.html_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), metadata.cloned()));
        match &self.html_failure {
            Some(message) => Err(RenderError::Other(message.clone())),
            None => Ok(self.html.clone()),
        }
    }
}
