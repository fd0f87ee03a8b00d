//! Owned syntax node representation
//!
//! Abstracts tree-sitter nodes for use in domain logic. Only named children
//! are kept as nodes; every piece of source text between them (punctuation,
//! keywords, whitespace, comments) is kept verbatim in `gaps`, so rendering
//! an untouched tree reproduces the input byte for byte and a rewritten tree
//! keeps the original formatting around every node it did not replace.

use serde::{Deserialize, Serialize};

use crate::shared::models::Span;

/// Stable node identifier, unique within one parsed file
///
/// Parsed nodes are numbered in pre-order; synthesized nodes are allocated
/// above the parsed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Syntax node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    Program,

    // Declarations
    VariableDeclarator,
    FieldDefinition,
    FunctionDeclaration,
    ClassDeclaration,
    Parameter,
    ImportStatement,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    NamespaceImport,

    // Expressions
    CallExpr,
    MemberExpr,
    NewExpr,
    Arguments,
    Identifier,
    PropertyIdentifier,
    This,
    ParenthesizedExpr,
    NonNullExpr,
    AsExpr,
    SpreadElement,
    OptionalChain,
    ArrayLiteral,
    ObjectLiteral,
    Pair,
    StringLiteral,
    Literal,
    FunctionExpr,

    // Types
    TypeAnnotation,
    GenericType,
    TypeIdentifier,
    TypeArguments,

    // Unknown/Other
    Other(String),
}

impl SyntaxKind {
    /// Map a tree-sitter-typescript node kind
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "program" => SyntaxKind::Program,

            "variable_declarator" => SyntaxKind::VariableDeclarator,
            "public_field_definition" | "field_definition" => SyntaxKind::FieldDefinition,
            "function_declaration" | "generator_function_declaration" => {
                SyntaxKind::FunctionDeclaration
            }
            "class_declaration" | "abstract_class_declaration" => SyntaxKind::ClassDeclaration,
            "required_parameter" | "optional_parameter" => SyntaxKind::Parameter,
            "import_statement" => SyntaxKind::ImportStatement,
            "import_clause" => SyntaxKind::ImportClause,
            "named_imports" => SyntaxKind::NamedImports,
            "import_specifier" => SyntaxKind::ImportSpecifier,
            "namespace_import" => SyntaxKind::NamespaceImport,

            "call_expression" => SyntaxKind::CallExpr,
            "member_expression" => SyntaxKind::MemberExpr,
            "new_expression" => SyntaxKind::NewExpr,
            "arguments" => SyntaxKind::Arguments,
            "identifier" | "shorthand_property_identifier" => SyntaxKind::Identifier,
            "property_identifier" | "private_property_identifier" => {
                SyntaxKind::PropertyIdentifier
            }
            "this" => SyntaxKind::This,
            "parenthesized_expression" => SyntaxKind::ParenthesizedExpr,
            "non_null_expression" => SyntaxKind::NonNullExpr,
            "as_expression" | "satisfies_expression" | "type_assertion" => SyntaxKind::AsExpr,
            "spread_element" => SyntaxKind::SpreadElement,
            "optional_chain" => SyntaxKind::OptionalChain,
            "array" => SyntaxKind::ArrayLiteral,
            "object" => SyntaxKind::ObjectLiteral,
            "pair" => SyntaxKind::Pair,
            "string" => SyntaxKind::StringLiteral,
            "number" | "true" | "false" | "null" | "undefined" | "template_string" | "regex" => {
                SyntaxKind::Literal
            }
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                SyntaxKind::FunctionExpr
            }

            "type_annotation" => SyntaxKind::TypeAnnotation,
            "generic_type" => SyntaxKind::GenericType,
            "type_identifier" | "nested_type_identifier" => SyntaxKind::TypeIdentifier,
            "type_arguments" => SyntaxKind::TypeArguments,

            other => SyntaxKind::Other(other.to_string()),
        }
    }

    /// Expressions that only wrap a single inner expression
    pub fn is_transparent_wrapper(&self) -> bool {
        matches!(
            self,
            SyntaxKind::ParenthesizedExpr | SyntaxKind::NonNullExpr | SyntaxKind::AsExpr
        )
    }
}

/// Owned syntax node
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub id: NodeId,
    pub kind: SyntaxKind,

    /// Original tree-sitter kind (synthesized nodes use the equivalent name)
    pub raw_kind: String,

    /// Field name this node occupies in its parent (`function`, `object`, ...)
    pub field: Option<&'static str>,

    /// Source span; `None` for synthesized nodes
    pub span: Option<Span>,

    pub children: Vec<SyntaxNode>,

    /// Verbatim text around children: `gaps.len() == children.len() + 1`
    gaps: Vec<String>,
}

impl SyntaxNode {
    /// Build a node read from source
    pub fn parsed(
        id: NodeId,
        raw_kind: &str,
        field: Option<&'static str>,
        span: Span,
        children: Vec<SyntaxNode>,
        gaps: Vec<String>,
    ) -> Self {
        debug_assert_eq!(gaps.len(), children.len() + 1);
        Self {
            id,
            kind: SyntaxKind::from_raw(raw_kind),
            raw_kind: raw_kind.to_string(),
            field,
            span: Some(span),
            children,
            gaps,
        }
    }

    /// Build a synthesized node from children and the text between them
    pub fn synthetic(
        id: NodeId,
        raw_kind: &str,
        children: Vec<SyntaxNode>,
        gaps: Vec<String>,
    ) -> Self {
        debug_assert_eq!(gaps.len(), children.len() + 1);
        Self {
            id,
            kind: SyntaxKind::from_raw(raw_kind),
            raw_kind: raw_kind.to_string(),
            field: None,
            span: None,
            children,
            gaps,
        }
    }

    /// Build a synthesized leaf holding raw text
    pub fn synthetic_leaf(id: NodeId, raw_kind: &str, text: impl Into<String>) -> Self {
        Self::synthetic(id, raw_kind, Vec::new(), vec![text.into()])
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.span.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Text of a leaf node
    pub fn leaf_text(&self) -> Option<&str> {
        if self.is_leaf() {
            self.gaps.first().map(|s| s.as_str())
        } else {
            None
        }
    }

    /// Full text of this node (rendered)
    pub fn text(&self) -> String {
        self.render()
    }

    /// Verbatim text between children
    pub fn gaps(&self) -> &[String] {
        &self.gaps
    }

    /// Iterate over the anonymous tokens found in the gaps (keywords, punctuation),
    /// skipping comments
    pub fn gap_tokens(&self) -> impl Iterator<Item = &str> {
        self.gaps
            .iter()
            .flat_map(|gap| outside_comments(gap))
            .flat_map(|code| {
                code.split(|c: char| c.is_whitespace() || c == ':' || c == ';' || c == ',')
                    .filter(|token| !token.is_empty())
            })
    }

    /// Find the child occupying a field
    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// Index of the child occupying a field
    pub fn child_index_by_field(&self, field: &str) -> Option<usize> {
        self.children.iter().position(|c| c.field == Some(field))
    }

    /// Find first child of given kind
    pub fn find_child(&self, kind: &SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| &c.kind == kind)
    }

    /// Find all children of given kind
    pub fn find_children(&self, kind: &SyntaxKind) -> Vec<&SyntaxNode> {
        self.children.iter().filter(|c| &c.kind == kind).collect()
    }

    /// Find a descendant of given kind (depth-first, pre-order)
    pub fn find_descendant(&self, kind: &SyntaxKind) -> Option<&SyntaxNode> {
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            if &current.kind == kind {
                return Some(current);
            }
            stack.extend(current.children.iter().rev());
        }
        None
    }

    /// Replace the child at `index`, keeping its field name
    pub fn replace_child(&mut self, index: usize, mut child: SyntaxNode) {
        child.field = self.children[index].field;
        self.children[index] = child;
    }

    /// Append a child, preceded by `separator`
    pub fn push_child(&mut self, separator: impl Into<String>, child: SyntaxNode) {
        let tail = self.gaps.pop().unwrap_or_default();
        self.gaps.push(separator.into());
        self.gaps.push(tail);
        self.children.push(child);
    }

    /// Insert a child before every existing child, followed by `separator`
    pub fn prepend_child(&mut self, child: SyntaxNode, separator: impl Into<String>) {
        let head = if self.gaps.is_empty() {
            String::new()
        } else {
            std::mem::take(&mut self.gaps[0])
        };
        if self.gaps.is_empty() {
            self.gaps.push(String::new());
        }
        self.gaps.insert(1, format!("{}{}", separator.into(), head));
        self.children.insert(0, child);
    }

    /// Copy of this node whose children are `f(child)`, in order
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&SyntaxNode) -> Result<SyntaxNode, E>,
    ) -> Result<SyntaxNode, E> {
        let children = self
            .children
            .iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self {
            id: self.id,
            kind: self.kind.clone(),
            raw_kind: self.raw_kind.clone(),
            field: self.field,
            span: self.span,
            children,
            gaps: self.gaps.clone(),
        })
    }

    /// Render this subtree to source text
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub fn write_to(&self, out: &mut String) {
        for (i, gap) in self.gaps.iter().enumerate() {
            out.push_str(gap);
            if let Some(child) = self.children.get(i) {
                child.write_to(out);
            }
        }
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::node_count).sum::<usize>()
    }
}

/// Slices of `text` outside `// line` and `/* block */` comments
fn outside_comments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("//").into_iter().chain(rest.find("/*")).min() {
        segments.push(&rest[..start]);
        let comment = &rest[start..];
        let end = if comment.starts_with("//") {
            comment.find('\n').unwrap_or(comment.len())
        } else {
            comment.find("*/").map_or(comment.len(), |close| close + 2)
        };
        rest = &comment[end..];
    }
    segments.push(rest);
    segments
}
