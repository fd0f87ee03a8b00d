//! Per-file declaration index
//!
//! Records every name a file declares, independent of the lineage table.
//! The classifier uses it to tell RxJS operators from local functions of the
//! same name, and the resolver uses it to anchor streams that were not
//! created by a recognized construct (parameters, imports, service calls).

use rustc_hash::FxHashMap;

use crate::features::instrumentation::infrastructure::operators::is_rxjs_module;
use crate::features::parsing::domain::{SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::{
    fields, node_kinds,
};
use crate::shared::models::SourcePosition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Variable,
    Parameter,
    Function,
    Class,
    Import { module: String },
    Field,
}

impl DeclarationKind {
    /// Visible before its own position
    fn is_hoisted(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Function | DeclarationKind::Class | DeclarationKind::Import { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub position: SourcePosition,
}

/// Outcome of looking a name up from a reference site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationLookup<'a> {
    Found(&'a Declaration),
    /// Declared, but only after the reference
    OnlyLater,
    Undeclared,
}

#[derive(Debug, Default)]
pub struct DeclarationIndex {
    lexical: FxHashMap<String, Vec<Declaration>>,
    fields: FxHashMap<String, Vec<Declaration>>,
}

impl DeclarationIndex {
    pub fn build(root: &SyntaxNode, file: &str) -> Self {
        let mut index = Self::default();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            index.collect(node, file);
            stack.extend(node.children.iter().rev());
        }

        for declarations in index.lexical.values_mut().chain(index.fields.values_mut()) {
            declarations.sort_by_key(|d| d.position.start);
        }
        index
    }

    fn collect(&mut self, node: &SyntaxNode, file: &str) {
        match node.raw_kind.as_str() {
            node_kinds::VARIABLE_DECLARATOR => {
                if let Some(pattern) = node.child_by_field(fields::NAME) {
                    self.add_pattern(pattern, DeclarationKind::Variable, file);
                }
            }
            node_kinds::FUNCTION_DECLARATION | node_kinds::GENERATOR_FUNCTION_DECLARATION => {
                if let Some(name) = node.child_by_field(fields::NAME) {
                    self.add(name, DeclarationKind::Function, file);
                }
            }
            node_kinds::CLASS_DECLARATION | node_kinds::ABSTRACT_CLASS_DECLARATION => {
                if let Some(name) = node.child_by_field(fields::NAME) {
                    self.add(name, DeclarationKind::Class, file);
                }
            }
            node_kinds::REQUIRED_PARAMETER | node_kinds::OPTIONAL_PARAMETER => {
                if let Some(pattern) = node.child_by_field(fields::PATTERN) {
                    self.add_pattern(pattern, DeclarationKind::Parameter, file);
                }
            }
            node_kinds::ARROW_FUNCTION => {
                if let Some(param) = node.child_by_field(fields::PARAMETER) {
                    self.add_pattern(param, DeclarationKind::Parameter, file);
                }
            }
            node_kinds::PUBLIC_FIELD_DEFINITION => {
                if let Some(name) = node.child_by_field(fields::NAME) {
                    self.add(name, DeclarationKind::Field, file);
                }
            }
            node_kinds::IMPORT_STATEMENT => self.add_import(node, file),
            _ => {}
        }
    }

    fn add(&mut self, name_node: &SyntaxNode, kind: DeclarationKind, file: &str) {
        let Some(span) = name_node.span else {
            return;
        };
        let name = name_node.text();
        let declaration = Declaration {
            name: name.clone(),
            kind,
            position: SourcePosition::from_span(file, &span),
        };
        let table = if declaration.kind == DeclarationKind::Field {
            &mut self.fields
        } else {
            &mut self.lexical
        };
        table.entry(name).or_default().push(declaration);
    }

    /// Every identifier bound by a (possibly destructuring) pattern
    fn add_pattern(&mut self, pattern: &SyntaxNode, kind: DeclarationKind, file: &str) {
        match pattern.raw_kind.as_str() {
            node_kinds::IDENTIFIER | node_kinds::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => {
                self.add(pattern, kind, file)
            }
            _ => {
                for child in &pattern.children {
                    // default values and type annotations bind nothing
                    if child.field == Some(fields::RIGHT) || child.field == Some(fields::TYPE) {
                        continue;
                    }
                    if child.raw_kind == node_kinds::TYPE_ANNOTATION {
                        continue;
                    }
                    self.add_pattern(child, kind.clone(), file);
                }
            }
        }
    }

    fn add_import(&mut self, statement: &SyntaxNode, file: &str) {
        let Some(module) = statement
            .child_by_field(fields::SOURCE)
            .map(|source| import_module(&source.text()))
        else {
            return;
        };
        let Some(clause) = statement
            .children
            .iter()
            .find(|c| c.raw_kind == node_kinds::IMPORT_CLAUSE)
        else {
            return;
        };

        let kind = DeclarationKind::Import { module };
        for part in &clause.children {
            match part.raw_kind.as_str() {
                // default import
                node_kinds::IDENTIFIER => self.add(part, kind.clone(), file),
                node_kinds::NAMESPACE_IMPORT => {
                    if let Some(name) = part.find_child(&SyntaxKind::Identifier) {
                        self.add(name, kind.clone(), file);
                    }
                }
                node_kinds::NAMED_IMPORTS => {
                    for specifier in &part.children {
                        let local = specifier
                            .child_by_field(fields::ALIAS)
                            .or_else(|| specifier.child_by_field(fields::NAME));
                        if let Some(local) = local {
                            self.add(local, kind.clone(), file);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    pub fn declarations(&self, name: &str) -> &[Declaration] {
        self.lexical.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First class field declared with this name
    pub fn field(&self, name: &str) -> Option<&Declaration> {
        self.fields.get(name).and_then(|fields| fields.first())
    }

    /// No local declaration shadows the name (only RxJS imports, or nothing)
    pub fn is_rxjs_binding(&self, name: &str) -> bool {
        self.declarations(name).iter().all(|d| match &d.kind {
            DeclarationKind::Import { module } => is_rxjs_module(module),
            _ => false,
        })
    }

    /// Nearest declaration visible from byte offset `at`
    pub fn lookup_before(&self, name: &str, at: usize) -> DeclarationLookup<'_> {
        let declarations = self.declarations(name);
        if declarations.is_empty() {
            return DeclarationLookup::Undeclared;
        }

        if let Some(preceding) = declarations
            .iter()
            .rev()
            .find(|d| d.position.start < at)
        {
            return DeclarationLookup::Found(preceding);
        }

        match declarations.iter().find(|d| d.kind.is_hoisted()) {
            Some(hoisted) => DeclarationLookup::Found(hoisted),
            None => DeclarationLookup::OnlyLater,
        }
    }
}

/// Module specifier without its quotes
pub fn import_module(source_literal: &str) -> String {
    source_literal
        .trim()
        .trim_matches(|c| c == '\'' || c == '"' || c == '`')
        .to_string()
}
