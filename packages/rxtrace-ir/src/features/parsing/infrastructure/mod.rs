//! Parsing infrastructure - external dependencies

pub mod tree_sitter;

pub use tree_sitter::TreeSitterParser;
