//! Event-driven markdown renderer, generic over the output backend.

use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::backend::{AlertKind, RenderBackend};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};
use crate::util::{fence_language, heading_level_to_num, parser_options};

/// Rendered document body plus the structure collected on the way.
#[derive(Clone, Debug)]
pub struct RenderResult {
    pub html: String,
    /// First H1, when title extraction is enabled.
    pub title: Option<String>,
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer.
///
/// Elements shared by every output format (paragraphs, lists, tables,
/// inline formatting) are written here; code blocks, quotes, alerts and
/// images go through the [`RenderBackend`].
pub struct MarkdownRenderer<B: RenderBackend> {
    out: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// `(src, title)` of the image whose alt text is being collected.
    image_target: Option<(String, String)>,
    /// One entry per open blockquote; `Some` for alerts.
    quotes: Vec<Option<AlertKind>>,
    gfm: bool,
    backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            image_target: None,
            quotes: Vec::new(),
            gfm: true,
            backend: PhantomData,
        }
    }

    /// Report the first H1 as the title and keep it out of the TOC.
    ///
    /// The heading is still rendered.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Toggle GitHub Flavored Markdown (tables, strikethrough, task lists,
    /// alerts).
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parse and render `markdown`.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let options = parser_options(self.gfm);
        self.render(Parser::new_ext(markdown, options))
    }

    /// Render a stream of parser events.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.on_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.out),
            title: self.heading.take_title(),
            toc: self.heading.take_toc(),
        }
    }

    /// Append inline markup to the open heading, or to the body.
    ///
    /// Dropped while collecting image alt text.
    fn emit(&mut self, markup: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(markup);
        } else {
            self.out.push_str(markup);
        }
    }

    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.on_start(tag),
            Event::End(tag) => self.on_end(tag),
            Event::Text(text) => self.on_text(&text),
            Event::Code(code) => self.on_inline_code(&code),
            Event::Html(raw) => self.out.push_str(&raw),
            Event::InlineHtml(raw) => self.emit(&raw),
            Event::SoftBreak => self.on_soft_break(),
            Event::HardBreak => B::hard_break(&mut self.out),
            Event::Rule => B::horizontal_rule(&mut self.out),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.out),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn on_start(&mut self, tag: Tag<'_>) {
        if let Some(name) = plain_element(tag.to_end()) {
            self.emit(&format!("<{name}>"));
            return;
        }
        match tag {
            // Written on close, once the id is known.
            Tag::Heading { level, .. } => self.heading.start_heading(heading_level_to_num(level)),
            Tag::BlockQuote(kind) => {
                let alert = kind.map(AlertKind::from);
                match alert {
                    Some(kind) => B::alert_start(kind, &mut self.out),
                    None => B::blockquote_start(&mut self.out),
                }
                self.quotes.push(alert);
            }
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => self.code.start(fence_language(&info)),
            Tag::CodeBlock(CodeBlockKind::Indented) => self.code.start(None),
            Tag::List(None) => self.out.push_str("<ul>"),
            Tag::List(Some(1)) => self.out.push_str("<ol>"),
            Tag::List(Some(start)) => {
                let _ = write!(self.out, r#"<ol start="{start}">"#);
            }
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.out.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.out.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.out.push_str("<tr>");
            }
            Tag::TableCell => {
                let _ = write!(
                    self.out,
                    "<{}{}>",
                    self.cell_element(),
                    self.table.current_alignment_style()
                );
            }
            Tag::Link { dest_url, .. } => {
                self.emit(&format!(r#"<a href="{}">"#, escape_html(&dest_url)));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.image_target = Some((dest_url.into_string(), title.into_string()));
            }
            _ => {}
        }
    }

    fn on_end(&mut self, tag: TagEnd) {
        if let Some(name) = plain_element(tag) {
            self.emit(&format!("</{name}>"));
            return;
        }
        match tag {
            TagEnd::Heading(_) => {
                if let Some((level, id, _text, html)) = self.heading.complete_heading() {
                    let _ = write!(self.out, r#"<h{level} id="{id}">{}</h{level}>"#, html.trim());
                }
            }
            TagEnd::BlockQuote(_) => match self.quotes.pop().flatten() {
                Some(kind) => B::alert_end(kind, &mut self.out),
                None => B::blockquote_end(&mut self.out),
            },
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                B::code_block(lang.as_deref(), &content, &mut self.out);
            }
            TagEnd::List(true) => self.out.push_str("</ol>"),
            TagEnd::List(false) => self.out.push_str("</ul>"),
            TagEnd::Table => self.out.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.table.end_head();
                self.out.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.out.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.out, "</{}>", self.cell_element());
                self.table.next_cell();
            }
            TagEnd::Link => self.emit("</a>"),
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.image_target.take() {
                    B::image(&src, &alt, &title, &mut self.out);
                }
            }
            _ => {}
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            if self.heading.is_active() {
                self.heading.push_text(text);
            }
            self.emit(&escape_html(text));
        }
    }

    fn on_inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.emit(&format!("<code>{}</code>", escape_html(code)));
    }

    fn on_soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(" ");
        }
        self.emit("\n");
    }

    fn cell_element(&self) -> &'static str {
        if self.table.is_in_head() { "th" } else { "td" }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Element name for tags written as a bare open/close pair.
fn plain_element(tag: TagEnd) -> Option<&'static str> {
    let name = match tag {
        TagEnd::Paragraph => "p",
        TagEnd::Item => "li",
        TagEnd::DefinitionList => "dl",
        TagEnd::DefinitionListTitle => "dt",
        TagEnd::DefinitionListDefinition => "dd",
        TagEnd::Emphasis => "em",
        TagEnd::Strong => "strong",
        TagEnd::Strikethrough => "s",
        TagEnd::Superscript => "sup",
        TagEnd::Subscript => "sub",
        _ => return None,
    };
    Some(name)
}
