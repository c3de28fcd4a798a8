//! Built-in markdown spec renderer with pluggable backends.
//!
//! This crate provides a generic [`MarkdownRenderer`] that produces
//! HTML output using the [`RenderBackend`] trait, an [`outline`] pass
//! that extracts document structure without rendering, and a standalone
//! page template ([`render_page`]).
//!
//! # Example
//!
//! ```
//! use specrel_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n**Bold** text");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! ```

mod backend;
mod html;
mod outline;
mod page;
mod renderer;
mod state;
mod util;

pub use backend::{AlertKind, RenderBackend};
pub use html::HtmlBackend;
pub use outline::{Outline, outline};
pub use page::{PageData, render_page};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html};
