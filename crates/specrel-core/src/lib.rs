//! Spec document validation and processing core for release pipelines.
//!
//! A release orchestrator drives this crate through four stages, one
//! [`SpecRelease`] per release attempt:
//!
//! 1. [`verify_conditions`](SpecRelease::verify_conditions) runs the
//!    [`PreconditionValidator`]: library available, spec path set and
//!    present, renderer plugin named, output path set.
//! 2. [`verify_release`](SpecRelease::verify_release) parses the spec.
//! 3. [`prepare`](SpecRelease::prepare) renders it, through the built-in
//!    renderer or a named renderer plugin, and keeps the artifact.
//! 4. [`publish`](SpecRelease::publish) writes the artifact.
//!
//! The per-document state lives in [`DocumentSpec`], which parses at most
//! once and reuses that result for every render.
//!
//! Every external collaborator sits behind a trait so the core never
//! hardcodes how things are found or touched:
//! - [`LibraryResolver`] finds the document-processing library by name
//! - [`RendererLoader`] finds renderer plugins by package name
//! - [`FileProbe`] answers existence checks and performs writes
//!
//! Failures are reported as [`ReleaseError`], each with a stable
//! machine-readable [`code`](ReleaseError::code) and its cause chain intact.

mod context;
mod error;
mod library;
mod lifecycle;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod plugin;
mod probe;
mod resolve;
mod spec;
mod validator;

pub use context::ReleaseContext;
pub use error::ReleaseError;
pub use library::{MarkdownLibrary, ParseError, ParseHandle, RenderError, SpecAst, SpecLibrary};
pub use lifecycle::SpecRelease;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockLibrary, MockProbe, ProbeCall};
pub use plugin::{CommandRenderer, LoadError, PluginLoader, Renderer, RendererLoader};
pub use probe::{FileProbe, FsProbe};
pub use resolve::{LibraryRegistry, LibraryResolver, ResolveError};
pub use spec::{DocumentSpec, RendererPlugin, SpecBuilder, SpecError};
pub use validator::PreconditionValidator;

pub use specrel_config::{Metadata, ReleaseConfig, RendererPluginConfig};
