//! Document-processing library seam and the built-in markdown library.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use specrel_config::Metadata;
use specrel_renderer::{HtmlBackend, MarkdownRenderer, PageData, TocEntry, outline, render_page};

/// Parsed representation of a spec document.
///
/// Opaque to the orchestration core; renderers may consume it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecAst {
    /// Title from the first H1 heading.
    pub title: Option<String>,
    /// Headings (excluding the title) in document order.
    pub headings: Vec<TocEntry>,
    /// Number of top-level blocks.
    pub blocks: usize,
    /// Raw document source.
    pub source: String,
}

impl SpecAst {
    /// True if the document has no block content.
    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }
}

/// Error returned by a library's parse operation.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source could not be read.
    #[error("Cannot read spec at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source was read but rejected by the parser.
    #[error("Invalid spec: {0}")]
    Invalid(String),
}

/// Error returned by a render strategy.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source could not be read.
    #[error("Cannot read spec at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Renderer input could not be encoded.
    #[error("Cannot encode renderer input")]
    Encode(#[source] serde_json::Error),
    /// Renderer process could not be run.
    #[error("Cannot run renderer {}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Renderer process I/O failed.
    #[error("Renderer I/O failed")]
    Io(#[source] io::Error),
    /// Renderer process exited unsuccessfully.
    #[error("Renderer exited with status {exit_code:?}: {stderr}")]
    Command {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Renderer produced output that is not UTF-8.
    #[error("Renderer output is not valid UTF-8")]
    Utf8(#[source] std::string::FromUtf8Error),
    /// Renderer-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Shared handle to the memoized outcome of a parse.
///
/// Cloning is cheap. Renderers receive a handle rather than a forced value
/// and may inspect the outcome or ignore it.
#[derive(Clone, Debug)]
pub struct ParseHandle(Result<Arc<SpecAst>, Arc<ParseError>>);

impl ParseHandle {
    /// Borrow the parse outcome.
    pub fn ast(&self) -> Result<&SpecAst, &ParseError> {
        match &self.0 {
            Ok(ast) => Ok(ast),
            Err(err) => Err(err),
        }
    }

    /// Shared ownership of the parse outcome.
    pub fn outcome(&self) -> Result<Arc<SpecAst>, Arc<ParseError>> {
        self.0.clone()
    }
}

impl From<Result<SpecAst, ParseError>> for ParseHandle {
    fn from(outcome: Result<SpecAst, ParseError>) -> Self {
        Self(outcome.map(Arc::new).map_err(Arc::new))
    }
}

/// Document-processing library: a parser plus a built-in renderer.
pub trait SpecLibrary: Send + Sync {
    /// Parse the spec at `path`.
    fn parse(&self, path: &Path) -> Result<SpecAst, ParseError>;

    /// Render the spec at `path` to HTML.
    fn html(&self, path: &Path, metadata: Option<&Metadata>) -> Result<String, RenderError>;
}

/// Built-in markdown library backed by `specrel-renderer`.
///
/// Metadata keys understood by [`html`](SpecLibrary::html):
/// - `title`: page title (defaults to the first H1, then the file stem)
/// - `head`: raw markup appended to `<head>`
/// - `githubSource`: URL rendered as a source link
#[derive(Debug, Default)]
pub struct MarkdownLibrary;

impl MarkdownLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SpecLibrary for MarkdownLibrary {
    fn parse(&self, path: &Path) -> Result<SpecAst, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let outline = outline(&source);
        tracing::debug!(
            path = %path.display(),
            blocks = outline.blocks,
            headings = outline.headings.len(),
            "Parsed spec"
        );
        Ok(SpecAst {
            title: outline.title,
            headings: outline.headings,
            blocks: outline.blocks,
            source,
        })
    }

    fn html(&self, path: &Path, metadata: Option<&Metadata>) -> Result<String, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let result = MarkdownRenderer::<HtmlBackend>::new()
            .with_title_extraction()
            .render_markdown(&source);

        let fallback_title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = meta_str(metadata, "title")
            .or(result.title.as_deref())
            .unwrap_or(&fallback_title);

        Ok(render_page(&PageData {
            title,
            head: meta_str(metadata, "head"),
            html_content: &result.html,
            toc: &result.toc,
            source_url: meta_str(metadata, "githubSource"),
        }))
    }
}

fn meta_str<'a>(metadata: Option<&'a Metadata>, key: &str) -> Option<&'a str> {
    metadata?.get(key)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write_spec(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protocol.md");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_extracts_structure() {
        let (_dir, path) = write_spec("# Protocol\n\nBody.\n\n## Framing\n");
        let ast = MarkdownLibrary::new().parse(&path).unwrap();

        assert_eq!(ast.title.as_deref(), Some("Protocol"));
        assert_eq!(ast.headings.len(), 1);
        assert_eq!(ast.headings[0].id, "framing");
        assert_eq!(ast.blocks, 3);
        assert!(!ast.is_empty());
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkdownLibrary::new()
            .parse(&dir.path().join("nope.md"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
    }

    #[test]
    fn test_html_uses_extracted_title() {
        let (_dir, path) = write_spec("# Protocol\n\n## Framing\n");
        let html = MarkdownLibrary::new().html(&path, None).unwrap();

        assert!(html.contains("<title>Protocol</title>"));
        assert!(html.contains(r#"<h2 id="framing">Framing</h2>"#));
        assert!(html.contains(r##"<a href="#framing">Framing</a>"##));
    }

    #[test]
    fn test_html_falls_back_to_file_stem() {
        let (_dir, path) = write_spec("No heading here.");
        let html = MarkdownLibrary::new().html(&path, None).unwrap();
        assert!(html.contains("<title>protocol</title>"));
    }

    #[test]
    fn test_html_applies_metadata() {
        let (_dir, path) = write_spec("# Protocol\n");
        let metadata = json!({
            "title": "Protocol v2",
            "head": "<meta name=\"robots\" content=\"noindex\">",
            "githubSource": "https://github.com/acme/protocol/blob/main/protocol.md",
            "ignored": 42
        });
        let metadata = metadata.as_object().unwrap();

        let html = MarkdownLibrary::new().html(&path, Some(metadata)).unwrap();

        assert!(html.contains("<title>Protocol v2</title>"));
        assert!(html.contains("<meta name=\"robots\" content=\"noindex\">"));
        assert!(html.contains("https://github.com/acme/protocol/blob/main/protocol.md"));
    }

    #[test]
    fn test_parse_handle_shares_outcome() {
        let handle = ParseHandle::from(Err(ParseError::Invalid("bad".to_owned())));
        let copy = handle.clone();

        let first = handle.outcome().unwrap_err();
        let second = copy.outcome().unwrap_err();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(copy.ast().unwrap_err().to_string(), "Invalid spec: bad");
    }
}
