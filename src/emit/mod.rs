//! Directive extraction and output documents.

pub mod directive;
pub mod document;

pub use directive::{extract, extract_tree, parse_directive, DirectiveNode, Flag};
pub use document::EmitDocument;
