//! Structural pass over a markdown document.
//!
//! Produces the title, headings and block count without rendering HTML.
//! This is the "parse" half of the built-in library: cheap enough to run
//! for validation, and serializable so external renderers can consume it.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::state::{HeadingState, TocEntry};
use crate::util::{heading_level_to_num, parser_options};

/// Document structure extracted by [`outline`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Outline {
    /// Title from the first H1 heading.
    pub title: Option<String>,
    /// All other headings in document order.
    pub headings: Vec<TocEntry>,
    /// Number of block-level elements.
    pub blocks: usize,
}

impl Outline {
    /// True if the document has no block content at all.
    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }
}

/// Extract the outline of a markdown document (GFM enabled).
pub fn outline(markdown: &str) -> Outline {
    let mut heading = HeadingState::new(true);
    let mut blocks = 0;
    let mut depth = 0usize;

    for event in Parser::new_ext(markdown, parser_options(true)) {
        match event {
            Event::Start(tag) => {
                if depth == 0 && is_block(&tag) {
                    blocks += 1;
                }
                if let Tag::Heading { level, .. } = tag {
                    heading.start_heading(heading_level_to_num(level));
                }
                depth += 1;
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                if let TagEnd::Heading(_) = tag {
                    heading.complete_heading();
                }
            }
            Event::Text(text) | Event::Code(text) if heading.is_active() => {
                heading.push_text(&text);
            }
            Event::SoftBreak if heading.is_active() => heading.push_text(" "),
            Event::Rule | Event::Html(_) if depth == 0 => blocks += 1,
            _ => {}
        }
    }

    Outline {
        title: heading.take_title(),
        headings: heading.take_toc(),
        blocks,
    }
}

fn is_block(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Table(_)
            | Tag::DefinitionList
    )
}
