//! Mutable rendering state tracked while walking markdown events.

use std::collections::HashSet;

use pulldown_cmark::Alignment;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text without markup.
    pub title: String,
    /// Anchor id, unique within the document.
    pub id: String,
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Turn heading text into an anchor slug.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    lang: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, lang: Option<String>) {
        self.active = true;
        self.lang = lang;
        self.buffer.clear();
    }

    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.lang.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// Table position and column alignments.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell) {
            Some(Alignment::Left) => r#" style="text-align: left""#,
            Some(Alignment::Center) => r#" style="text-align: center""#,
            Some(Alignment::Right) => r#" style="text-align: right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Image alt text being collected.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt.clear();
    }

    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt.push_str(text);
    }
}

/// Heading capture, id assignment, title and TOC collection.
///
/// With title extraction enabled, the first H1 becomes the document title
/// and is kept out of the TOC (it is still rendered).
pub(crate) struct HeadingState {
    extract_title: bool,
    level: Option<u8>,
    text: String,
    html: String,
    title: Option<String>,
    toc: Vec<TocEntry>,
    used_ids: HashSet<String>,
}

impl HeadingState {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            level: None,
            text: String::new(),
            html: String::new(),
            title: None,
            toc: Vec::new(),
            used_ids: HashSet::new(),
        }
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.level.is_some()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Finish the current heading.
    ///
    /// Returns `(level, id, text, html)`, or `None` if no heading was open.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, String, String, String)> {
        let level = self.level.take()?;
        let text = std::mem::take(&mut self.text).trim().to_owned();
        let html = std::mem::take(&mut self.html);
        let id = self.unique_id(&text);

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(text.clone());
        } else {
            self.toc.push(TocEntry {
                level,
                title: text.clone(),
                id: id.clone(),
            });
        }

        Some((level, id, text, html))
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }

    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut id = base.clone();
        let mut n = 1;
        while self.used_ids.contains(&id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.used_ids.insert(id.clone());
        id
    }
}
