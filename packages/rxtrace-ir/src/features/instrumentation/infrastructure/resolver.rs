//! Symbol resolver
//!
//! Owns the file-scoped lineage table (name → most recent observable or pipe
//! binding) and resolves the stream an expression originates from by walking
//! down its call/member chain.

use rustc_hash::FxHashMap;

use crate::features::instrumentation::infrastructure::context::FileContext;
use crate::features::instrumentation::infrastructure::declarations::DeclarationLookup;
use crate::features::instrumentation::infrastructure::shapes;
use crate::features::parsing::domain::{SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::fields;
use crate::shared::models::{Result, TransformError};
use crate::shared::utils::Identity;

/// Label of sources that no recognized construct created
pub const EXTERNAL_SOURCE: &str = "external";

/// Label of named pipes used as join inputs
pub const PIPE_SOURCE: &str = "pipe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableBinding {
    pub identity: Identity,
    /// Operator or constructor that created the stream
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeBinding {
    pub pipe: Identity,
    pub observable: Identity,
    /// Pipes the pipe's own source flows through, nearest first
    pub upstream: Vec<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Observable(ObservableBinding),
    Pipe(PipeBinding),
}

/// Where an expression's stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Observable {
        identity: Identity,
        identifier: Option<String>,
        label: String,
    },
    NamedPipe {
        name: String,
        binding: PipeBinding,
    },
}

impl Source {
    /// Identity of the originating observable (named pipes are followed)
    pub fn observable(&self) -> &Identity {
        match self {
            Source::Observable { identity, .. } => identity,
            Source::NamedPipe { binding, .. } => &binding.observable,
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolResolver {
    bindings: FxHashMap<String, Binding>,
}

impl SymbolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding; a later binding of the same name replaces it
    pub fn record_binding(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    /// Resolve the stream `expr` originates from
    pub fn resolve_source(&self, expr: &SyntaxNode, ctx: &FileContext<'_>) -> Result<Source> {
        let mut current = expr;
        let mut property: Option<&SyntaxNode> = None;

        loop {
            current = shapes::unwrap_transparent(current);
            match current.kind {
                SyntaxKind::CallExpr => {
                    let call = current;
                    property = None;
                    current = call
                        .child_by_field(fields::FUNCTION)
                        .ok_or_else(|| unresolved(call, ctx, "call without a callee"))?;
                }
                SyntaxKind::MemberExpr => {
                    let member = current;
                    property = member.child_by_field(fields::PROPERTY);
                    current = member
                        .child_by_field(fields::OBJECT)
                        .ok_or_else(|| unresolved(member, ctx, "member access without an object"))?;
                }
                SyntaxKind::NewExpr => {
                    let ctor = current.child_by_field(fields::CONSTRUCTOR).unwrap_or(current);
                    return Ok(Source::Observable {
                        identity: ctx.identity_of(ctor),
                        identifier: None,
                        label: ctor.text(),
                    });
                }
                SyntaxKind::Identifier => return self.resolve_identifier(current, ctx),
                SyntaxKind::This => return Ok(self.resolve_this_property(current, property, ctx)),
                _ => return Err(unresolved(current, ctx, "expression does not reference a stream")),
            }
        }
    }

    fn resolve_identifier(&self, ident: &SyntaxNode, ctx: &FileContext<'_>) -> Result<Source> {
        let name = ident.text();

        // `of(...)` in `of(...).pipe(...)`: anonymous stream anchored at its callee
        if ctx.is_callee(ident) {
            return Ok(Source::Observable {
                identity: ctx.identity_of(ident),
                identifier: None,
                label: name,
            });
        }

        if let Some(source) = self.from_binding(&name) {
            return Ok(source);
        }

        let at = ident.span.map(|s| s.start_byte).unwrap_or(0);
        match ctx.declarations.lookup_before(&name, at) {
            DeclarationLookup::Found(declaration) => Ok(Source::Observable {
                identity: ctx.identity.for_position(&declaration.position),
                identifier: Some(name),
                label: EXTERNAL_SOURCE.to_string(),
            }),
            DeclarationLookup::Undeclared => Ok(Source::Observable {
                identity: ctx.identity_of(ident),
                identifier: Some(name),
                label: EXTERNAL_SOURCE.to_string(),
            }),
            DeclarationLookup::OnlyLater => Err(TransformError::unresolved(
                name,
                "referenced before its declaration",
                ctx.position_of(ident),
            )),
        }
    }

    /// `this.name`: lineage binding, then class field, then the reference itself
    fn resolve_this_property(
        &self,
        this: &SyntaxNode,
        property: Option<&SyntaxNode>,
        ctx: &FileContext<'_>,
    ) -> Source {
        let Some(property) = property else {
            return Source::Observable {
                identity: ctx.identity_of(this),
                identifier: None,
                label: this.text(),
            };
        };
        let name = property.text();

        if let Some(source) = self.from_binding(&name) {
            return source;
        }

        let identity = match ctx.declarations.field(&name) {
            Some(field) => ctx.identity.for_position(&field.position),
            None => ctx.identity_of(property),
        };
        Source::Observable {
            identity,
            identifier: Some(name),
            label: EXTERNAL_SOURCE.to_string(),
        }
    }

    fn from_binding(&self, name: &str) -> Option<Source> {
        match self.bindings.get(name)? {
            Binding::Observable(binding) => Some(Source::Observable {
                identity: binding.identity.clone(),
                identifier: Some(name.to_string()),
                label: binding.label.clone(),
            }),
            Binding::Pipe(binding) => Some(Source::NamedPipe {
                name: name.to_string(),
                binding: binding.clone(),
            }),
        }
    }

    /// Identities of every pipe between `expr` and its observable, nearest first
    ///
    /// Pipes reached through a named pipe binding contribute that pipe and its
    /// recorded upstream chain.
    pub fn pipe_chain(&self, expr: &SyntaxNode, ctx: &FileContext<'_>) -> Vec<Identity> {
        let mut pipes = Vec::new();
        let mut current = expr;

        loop {
            current = shapes::unwrap_transparent(current);
            match current.kind {
                SyntaxKind::CallExpr => {
                    if let Some((_, pipe)) = shapes::member_call(current, "pipe") {
                        pipes.push(ctx.identity_of(pipe));
                    }
                    match current.child_by_field(fields::FUNCTION) {
                        Some(callee) => current = callee,
                        None => break,
                    }
                }
                SyntaxKind::MemberExpr => {
                    let Some(object) = current.child_by_field(fields::OBJECT) else {
                        break;
                    };
                    // `this.p$`: the field name is the lineage key
                    if shapes::unwrap_transparent(object).kind == SyntaxKind::This {
                        if let Some(property) = current.child_by_field(fields::PROPERTY) {
                            self.extend_with_named_pipe(&property.text(), &mut pipes);
                        }
                        break;
                    }
                    current = object;
                }
                SyntaxKind::Identifier if !ctx.is_callee(current) => {
                    self.extend_with_named_pipe(&current.text(), &mut pipes);
                    break;
                }
                _ => break,
            }
        }

        pipes
    }

    fn extend_with_named_pipe(&self, name: &str, pipes: &mut Vec<Identity>) {
        if let Some(Binding::Pipe(binding)) = self.bindings.get(name) {
            pipes.push(binding.pipe.clone());
            pipes.extend(binding.upstream.iter().cloned());
        }
    }
}

fn unresolved(node: &SyntaxNode, ctx: &FileContext<'_>, reason: &str) -> TransformError {
    TransformError::unresolved(node.text(), reason, ctx.position_of(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::domain::ParsedTree;
    use crate::features::parsing::{Parser, TreeSitterParser};
    use crate::shared::utils::IdentityGenerator;

    fn parse(source: &str) -> ParsedTree {
        TreeSitterParser::typescript().parse(source, "a.ts").unwrap()
    }

    /// Object expression of the last `.method(...)` call in pre-order
    fn receiver<'t>(tree: &'t ParsedTree, method: &str) -> &'t SyntaxNode {
        let mut found = None;
        let mut stack = vec![&tree.root];
        while let Some(node) = stack.pop() {
            if let Some((object, _)) = shapes::member_call(node, method) {
                found = Some(object);
            }
            stack.extend(node.children.iter().rev());
        }
        found.unwrap()
    }

    #[test]
    fn test_binding_resolution_and_overwrite() {
        let tree = parse("a$.subscribe();");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let first = IdentityGenerator::default().generate("a.ts", 1, 0, 2);
        let second = IdentityGenerator::default().generate("a.ts", 2, 0, 2);

        let mut resolver = SymbolResolver::new();
        resolver.record_binding(
            "a$",
            Binding::Observable(ObservableBinding {
                identity: first,
                label: "of".to_string(),
            }),
        );
        resolver.record_binding(
            "a$",
            Binding::Observable(ObservableBinding {
                identity: second.clone(),
                label: "interval".to_string(),
            }),
        );

        let source = resolver.resolve_source(receiver(&tree, "subscribe"), &ctx).unwrap();
        assert_eq!(source.observable(), &second);
    }

    #[test]
    fn test_anonymous_callee_source() {
        let tree = parse("of(1).pipe(map(x => x));");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());

        let source = SymbolResolver::new()
            .resolve_source(receiver(&tree, "pipe"), &ctx)
            .unwrap();
        // anchored at the `of` identifier (bytes 0..2)
        assert_eq!(
            source.observable(),
            &IdentityGenerator::default().generate("a.ts", 1, 0, 2)
        );
        assert!(matches!(source, Source::Observable { identifier: None, ref label, .. } if label == "of"));
    }

    #[test]
    fn test_external_sources() {
        let source_text = "function f(input$) { return input$.pipe(take(1)); }";
        let tree = parse(source_text);
        let ctx = FileContext::new(&tree, IdentityGenerator::default());

        let source = SymbolResolver::new()
            .resolve_source(receiver(&tree, "pipe"), &ctx)
            .unwrap();
        // anchored at the parameter declaration
        let param_start = source_text.find("input$").unwrap();
        assert_eq!(
            source.observable(),
            &IdentityGenerator::default().generate("a.ts", 1, param_start, param_start + 6)
        );
    }

    #[test]
    fn test_forward_reference_is_unresolved() {
        let tree = parse("late$.subscribe();\nconst late$ = load();\n");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());

        let error = SymbolResolver::new()
            .resolve_source(receiver(&tree, "subscribe"), &ctx)
            .unwrap_err();
        assert!(matches!(error, TransformError::UnresolvedSource { ref name, .. } if name == "late$"));
    }

    #[test]
    fn test_this_property_falls_back_to_field() {
        let source_text = "class A {\n  items$ = load();\n  run() { this.items$.subscribe(); }\n}\n";
        let tree = parse(source_text);
        let ctx = FileContext::new(&tree, IdentityGenerator::default());

        let source = SymbolResolver::new()
            .resolve_source(receiver(&tree, "subscribe"), &ctx)
            .unwrap();
        let field_start = source_text.find("items$").unwrap();
        assert_eq!(
            source.observable(),
            &IdentityGenerator::default().generate("a.ts", 2, field_start, field_start + 6)
        );
    }

    #[test]
    fn test_pipe_chain_through_named_pipe() {
        let tree = parse("p2.pipe(map(x => x)).pipe(filter(Boolean)).subscribe();");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let generator = IdentityGenerator::default();

        let p1 = generator.generate("a.ts", 1, 100, 104);
        let p2 = generator.generate("a.ts", 2, 100, 104);
        let mut resolver = SymbolResolver::new();
        resolver.record_binding(
            "p2",
            Binding::Pipe(PipeBinding {
                pipe: p2.clone(),
                observable: generator.generate("a.ts", 1, 0, 2),
                upstream: vec![p1.clone()],
            }),
        );

        let pipes = resolver.pipe_chain(receiver(&tree, "subscribe"), &ctx);
        assert_eq!(pipes.len(), 4);
        assert_eq!(&pipes[2..], &[p2, p1]);
    }

    #[test]
    fn test_pipe_chain_through_field_pipe() {
        let tree = parse("class A {\n  run() { this.p$.subscribe(); }\n}\n");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let generator = IdentityGenerator::default();

        let upstream = generator.generate("a.ts", 1, 10, 14);
        let field_pipe = generator.generate("a.ts", 2, 10, 14);
        let mut resolver = SymbolResolver::new();
        assert!(resolver.pipe_chain(receiver(&tree, "subscribe"), &ctx).is_empty());

        resolver.record_binding(
            "p$",
            Binding::Pipe(PipeBinding {
                pipe: field_pipe.clone(),
                observable: generator.generate("a.ts", 1, 0, 2),
                upstream: vec![upstream.clone()],
            }),
        );
        assert_eq!(
            resolver.pipe_chain(receiver(&tree, "subscribe"), &ctx),
            vec![field_pipe, upstream]
        );
    }
}
