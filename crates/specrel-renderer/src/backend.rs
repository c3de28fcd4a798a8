//! Render backend trait.

use pulldown_cmark::BlockQuoteKind;

/// GitHub-style alert kind (`> [!NOTE]` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

impl AlertKind {
    /// Lowercase name, as used in CSS classes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    /// Heading shown above the alert body.
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }
}

/// Format-specific rendering hooks.
///
/// Elements that look the same in every output format (tables, lists,
/// inline formatting) are handled by [`MarkdownRenderer`](crate::MarkdownRenderer);
/// the backend only decides how the remaining elements are written.
pub trait RenderBackend {
    /// Write a fenced or indented code block.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Open a regular blockquote.
    fn blockquote_start(out: &mut String);

    /// Close a regular blockquote.
    fn blockquote_end(out: &mut String);

    /// Open an alert blockquote.
    fn alert_start(kind: AlertKind, out: &mut String);

    /// Close an alert blockquote.
    fn alert_end(kind: AlertKind, out: &mut String);

    /// Write an image with its collected alt text.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
