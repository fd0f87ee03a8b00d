//! Tree-sitter parser implementation
//!
//! This is where tree-sitter dependency lives.

use std::path::Path;

use tree_sitter::{Node, Parser as TSParser, Tree};

use crate::features::parsing::domain::{NodeId, ParseError, ParsedTree, SyntaxNode};
use crate::features::parsing::ports::Parser;
use crate::shared::models::{Result, Span, TransformError};

/// Tree-sitter based parser
pub struct TreeSitterParser {
    language: TreeSitterLanguage,
}

/// Supported tree-sitter languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSitterLanguage {
    TypeScript,
    Tsx,
}

impl TreeSitterParser {
    /// Create a TypeScript parser
    pub fn typescript() -> Self {
        Self {
            language: TreeSitterLanguage::TypeScript,
        }
    }

    /// Create a TSX parser
    pub fn tsx() -> Self {
        Self {
            language: TreeSitterLanguage::Tsx,
        }
    }

    /// Pick the grammar matching a file's extension
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [Self::typescript(), Self::tsx()]
            .into_iter()
            .find(|parser| parser.supports_extension(ext))
    }

    pub fn language(&self) -> TreeSitterLanguage {
        self.language
    }

    /// Get the tree-sitter language
    fn get_ts_language(&self) -> tree_sitter::Language {
        match self.language {
            TreeSitterLanguage::TypeScript => tree_sitter_typescript::language_typescript(),
            TreeSitterLanguage::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }

    /// Convert tree-sitter tree to our domain model
    fn convert_tree(&self, tree: &Tree, source: &str, file_path: &str) -> ParsedTree {
        let root_node = tree.root_node();
        let mut next_id = 0u32;
        // The root owns the whole file so leading and trailing trivia survive rendering.
        let root = convert_node(
            &root_node,
            None,
            source,
            (0, source.len()),
            &mut next_id,
        );

        let mut errors = Vec::new();
        collect_errors(&root_node, &mut errors);

        ParsedTree::new(
            root,
            source.to_string(),
            file_path.to_string(),
            self.language_name().to_string(),
        )
        .with_errors(errors)
    }
}

fn span_of(node: &Node) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.start_position().column as u32,
        node.end_position().row as u32 + 1,
        node.end_position().column as u32,
    )
    .with_bytes(node.start_byte(), node.end_byte())
}

fn slice(source: &str, start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    source.get(start..end).unwrap_or_default().to_string()
}

/// Convert a tree-sitter node to SyntaxNode
///
/// Named, non-extra children become nodes. Everything between them, including
/// anonymous tokens and comments, is captured as gap text.
fn convert_node(
    node: &Node,
    field: Option<&'static str>,
    source: &str,
    range: (usize, usize),
    next_id: &mut u32,
) -> SyntaxNode {
    let id = NodeId(*next_id);
    *next_id += 1;

    let mut children = Vec::new();
    let mut gaps = Vec::new();
    let mut cursor_byte = range.0;

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() && !child.is_extra() {
                let child_field = cursor.field_name();
                let start = child.start_byte().max(cursor_byte);
                gaps.push(slice(source, cursor_byte, start));
                let end = child.end_byte().max(start);
                children.push(convert_node(
                    &child,
                    child_field,
                    source,
                    (start, end),
                    next_id,
                ));
                cursor_byte = end;
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    gaps.push(slice(source, cursor_byte, range.1));

    SyntaxNode::parsed(id, node.kind(), field, span_of(node), children, gaps)
}

/// Collect parse errors
fn collect_errors(node: &Node, errors: &mut Vec<ParseError>) {
    if node.is_error() || node.is_missing() {
        let message = if node.is_missing() {
            format!("Missing {}", node.kind())
        } else {
            "Unexpected syntax".to_string()
        };
        errors.push(ParseError {
            message,
            span: span_of(node),
        });
    }

    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(&child, errors);
    }
}

impl Parser for TreeSitterParser {
    fn parse(&self, source: &str, file_path: &str) -> Result<ParsedTree> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.get_ts_language())
            .map_err(|e| TransformError::parse(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| TransformError::parse("Failed to parse source code"))?;

        Ok(self.convert_tree(&tree, source, file_path))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        match self.language {
            TreeSitterLanguage::TypeScript => matches!(ext, "ts" | "mts" | "cts"),
            TreeSitterLanguage::Tsx => ext == "tsx",
        }
    }

    fn language_name(&self) -> &'static str {
        match self.language {
            TreeSitterLanguage::TypeScript => "typescript",
            TreeSitterLanguage::Tsx => "tsx",
        }
    }
}
