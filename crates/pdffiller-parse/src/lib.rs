//! pdffiller-parse: lopdf-backed AcroForm engine.
//!
//! This crate reads the field tree out of a parsed document, writes filled
//! values back into the object graph, synthesizes text appearances and
//! flattens widgets into page content. It depends on pdffiller-core for the
//! field model and value rules.

pub mod appearance;
pub mod apply;
pub mod builder;
pub mod document;
pub mod error;
pub mod flatten;
pub mod fonts;
pub mod graph;

#[cfg(test)]
mod fixtures;

pub use apply::apply_values;
pub use builder::build_field_tree;
pub use document::FormDocument;
pub use error::BackendError;
pub use flatten::flatten;
pub use pdffiller_core;
