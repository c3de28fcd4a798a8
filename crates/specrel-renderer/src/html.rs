//! HTML5 output backend.

use crate::backend::{AlertKind, RenderBackend};
use crate::state::escape_html;

/// Writes semantic HTML5 for standalone spec pages.
///
/// Alerts become `<div class="alert alert-{kind}">` with a title paragraph;
/// fenced code carries a `language-{lang}` class for client-side highlighting.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str("<pre><code");
        if let Some(lang) = lang {
            out.push_str(" class=\"language-");
            out.push_str(&escape_html(lang));
            out.push('"');
        }
        out.push('>');
        out.push_str(&escape_html(content));
        out.push_str("</code></pre>");
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn alert_start(kind: AlertKind, out: &mut String) {
        out.push_str(&format!(
            r#"<div class="alert alert-{}"><p class="alert-title">{}</p>"#,
            kind.name(),
            kind.label()
        ));
    }

    fn alert_end(_kind: AlertKind, out: &mut String) {
        out.push_str("</div>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        out.push_str(&format!(r#"<img src="{}" alt="{}""#, escape_html(src), escape_html(alt)));
        if !title.is_empty() {
            out.push_str(&format!(r#" title="{}""#, escape_html(title)));
        }
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(f: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        f(&mut out);
        out
    }

    #[test]
    fn test_code_block_language_class() {
        assert_eq!(
            write(|out| HtmlBackend::code_block(Some("toml"), "[spec]\n", out)),
            "<pre><code class=\"language-toml\">[spec]\n</code></pre>"
        );
        assert_eq!(
            write(|out| HtmlBackend::code_block(None, "a < b", out)),
            "<pre><code>a &lt; b</code></pre>"
        );
    }

    #[test]
    fn test_alert_markup() {
        let html = write(|out| {
            HtmlBackend::alert_start(AlertKind::Caution, out);
            HtmlBackend::alert_end(AlertKind::Caution, out);
        });
        assert_eq!(
            html,
            r#"<div class="alert alert-caution"><p class="alert-title">Caution</p></div>"#
        );
    }

    #[test]
    fn test_image_title_is_optional() {
        assert_eq!(
            write(|out| HtmlBackend::image("flow.svg", "Flow", "", out)),
            r#"<img src="flow.svg" alt="Flow">"#
        );
        assert_eq!(
            write(|out| HtmlBackend::image("flow.svg", "", "Stage \"2\"", out)),
            r#"<img src="flow.svg" alt="" title="Stage &quot;2&quot;">"#
        );
    }
}
