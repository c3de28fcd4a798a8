//! Standalone HTML page template.

use std::fmt::Write;

use crate::state::{TocEntry, escape_html};

/// All data needed to render a standalone spec page.
pub struct PageData<'a> {
    /// Document title (`<title>`).
    pub title: &'a str,
    /// Raw markup appended to `<head>`.
    pub head: Option<&'a str>,
    /// Rendered document body.
    pub html_content: &'a str,
    /// Table of contents entries.
    pub toc: &'a [TocEntry],
    /// Link to the document source, rendered in the footer.
    pub source_url: Option<&'a str>,
}

/// Render a complete HTML page.
pub fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(page.title));
    if let Some(head) = page.head {
        html.push_str(head);
        html.push('\n');
    }
    html.push_str("</head>\n<body>\n");

    render_toc(&mut html, page.toc);

    html.push_str("<main>\n<article class=\"spec\">\n");
    html.push_str(page.html_content);
    html.push_str("\n</article>\n</main>\n");

    if let Some(url) = page.source_url {
        let _ = writeln!(
            html,
            "<footer><a href=\"{}\">View source</a></footer>",
            escape_html(url)
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<nav class=\"toc\">\n<ol>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            entry.id,
            escape_html(&entry.title)
        );
    }
    html.push_str("</ol>\n</nav>\n");
}
