//! Structural accessors for the node shapes the pass matches

use crate::features::parsing::domain::{SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::{
    fields, is_initializable_field,
};

fn has_optional_chain(node: &SyntaxNode) -> bool {
    node.find_child(&SyntaxKind::OptionalChain).is_some()
}

/// Callee of `name(...)` when it is a plain identifier
pub fn callee_identifier(call: &SyntaxNode) -> Option<&SyntaxNode> {
    if call.kind != SyntaxKind::CallExpr || has_optional_chain(call) {
        return None;
    }
    call.child_by_field(fields::FUNCTION)
        .filter(|callee| callee.raw_kind == "identifier")
}

/// `(object, property)` of `object.method(...)`; optional chains never match
pub fn member_call<'n>(call: &'n SyntaxNode, method: &str) -> Option<(&'n SyntaxNode, &'n SyntaxNode)> {
    if call.kind != SyntaxKind::CallExpr || has_optional_chain(call) {
        return None;
    }
    let member = call
        .child_by_field(fields::FUNCTION)
        .filter(|callee| callee.kind == SyntaxKind::MemberExpr && !has_optional_chain(callee))?;
    let property = member
        .child_by_field(fields::PROPERTY)
        .filter(|property| property.leaf_text() == Some(method))?;
    let object = member.child_by_field(fields::OBJECT)?;
    Some((object, property))
}

/// Constructed type identifier of `new Name(...)`
pub fn constructed_type(new_expr: &SyntaxNode) -> Option<&SyntaxNode> {
    if new_expr.kind != SyntaxKind::NewExpr {
        return None;
    }
    new_expr
        .child_by_field(fields::CONSTRUCTOR)
        .filter(|ctor| ctor.raw_kind == "identifier")
}

/// Source text of each entry of a `<...>` list
pub fn type_argument_texts(type_arguments: Option<&SyntaxNode>) -> Vec<String> {
    type_arguments
        .map(|args| args.children.iter().map(SyntaxNode::text).collect())
        .unwrap_or_default()
}

/// Expression arguments of a call or `new` expression
pub fn call_arguments(call: &SyntaxNode) -> &[SyntaxNode] {
    call.child_by_field(fields::ARGUMENTS)
        .map(|args| args.children.as_slice())
        .unwrap_or(&[])
}

/// Declared type of a class field: type name node and its type arguments
pub fn field_type(field: &SyntaxNode) -> Option<(&SyntaxNode, Option<&SyntaxNode>)> {
    let annotation = field.child_by_field(fields::TYPE)?;
    let ty = annotation.children.first()?;
    match ty.kind {
        SyntaxKind::TypeIdentifier => Some((ty, None)),
        SyntaxKind::GenericType => {
            let name = ty.child_by_field(fields::NAME)?;
            Some((name, ty.child_by_field(fields::TYPE_ARGUMENTS)))
        }
        _ => None,
    }
}

/// Field that may legally receive an initializer
pub fn is_initializable(field: &SyntaxNode) -> bool {
    field.kind == SyntaxKind::FieldDefinition && is_initializable_field(field.gap_tokens())
}

/// Strip parentheses, non-null assertions and type assertions
pub fn unwrap_transparent(mut node: &SyntaxNode) -> &SyntaxNode {
    while node.kind.is_transparent_wrapper() {
        match node.children.first() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
