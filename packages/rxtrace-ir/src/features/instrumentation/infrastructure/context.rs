//! Read-only per-file context shared by the pass components

use crate::features::instrumentation::infrastructure::declarations::DeclarationIndex;
use crate::features::instrumentation::infrastructure::tree_index::TreeIndex;
use crate::features::parsing::domain::{ParsedTree, SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::fields;
use crate::shared::models::{SourcePosition, Span};
use crate::shared::utils::{Identity, IdentityGenerator};

/// Name recorded for constructs not bound to a variable or field
pub const ANONYMOUS: &str = "anonymous";

/// Original tree, its indexes and the identity generator for one file
pub struct FileContext<'t> {
    pub file: &'t str,
    pub index: TreeIndex<'t>,
    pub declarations: DeclarationIndex,
    pub identity: IdentityGenerator,
}

impl<'t> FileContext<'t> {
    pub fn new(tree: &'t ParsedTree, identity: IdentityGenerator) -> Self {
        Self {
            file: &tree.file_path,
            index: TreeIndex::build(&tree.root),
            declarations: DeclarationIndex::build(&tree.root, &tree.file_path),
            identity,
        }
    }

    /// Source coordinates of a node (synthesized nodes sit at 0:0)
    pub fn position_of(&self, node: &SyntaxNode) -> SourcePosition {
        SourcePosition::from_span(self.file, &node.span.unwrap_or_else(Span::zero))
    }

    pub fn identity_of(&self, node: &SyntaxNode) -> Identity {
        self.identity.for_position(&self.position_of(node))
    }

    pub fn parent(&self, node: &SyntaxNode) -> Option<&'t SyntaxNode> {
        self.index.parent(node.id)
    }

    /// Node is the callee of its parent call
    pub fn is_callee(&self, node: &SyntaxNode) -> bool {
        node.field == Some(fields::FUNCTION)
            && self
                .parent(node)
                .map(|p| p.kind == SyntaxKind::CallExpr)
                .unwrap_or(false)
    }

    /// Class field whose initializer is this node
    pub fn enclosing_field(&self, node: &SyntaxNode) -> Option<&'t SyntaxNode> {
        if node.field != Some(fields::VALUE) {
            return None;
        }
        self.parent(node)
            .filter(|parent| parent.kind == SyntaxKind::FieldDefinition)
    }

    /// Name a construct is bound to: the variable it initializes or the class
    /// field it is the value of
    pub fn binding_name(&self, node: &SyntaxNode) -> Option<String> {
        if node.field != Some(fields::VALUE) {
            return None;
        }
        let parent = self.parent(node)?;
        let name = match parent.kind {
            SyntaxKind::VariableDeclarator => parent
                .child_by_field(fields::NAME)
                .filter(|name| name.kind == SyntaxKind::Identifier)?,
            SyntaxKind::FieldDefinition => parent.child_by_field(fields::NAME)?,
            _ => return None,
        };
        Some(name.text())
    }

    pub fn binding_name_or_anonymous(&self, node: &SyntaxNode) -> String {
        self.binding_name(node)
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }
}
