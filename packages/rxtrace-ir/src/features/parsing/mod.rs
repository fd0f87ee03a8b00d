//! Parsing Feature
//!
//! Turns TypeScript source into an owned, losslessly renderable syntax tree.
//!
//! ## Structure
//! - `domain/` - ParsedTree, SyntaxNode models
//! - `ports/` - Parser trait
//! - `infrastructure/` - TreeSitterParser (TypeScript, TSX)

pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports
pub use domain::{NodeId, ParsedTree, SyntaxKind, SyntaxNode};
pub use infrastructure::TreeSitterParser;
pub use ports::Parser;
