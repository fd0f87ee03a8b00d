//! Metadata synthesizer
//!
//! Builds the metadata record of a classified node, plus the lineage binding
//! the match introduces. Nothing is recorded here: the driver records the
//! binding only once the rewrite succeeded.

use crate::features::instrumentation::domain::{
    BaseObservable, ConstructKind, ConstructMetadata, CreationOperatorMetadata,
    JoinCreationOperatorMetadata, MetadataHeader, ObservableSubjectConstructorMetadata,
    OperatorPosition, PipeMetadata, PipeableOperatorMetadata, PropertyDeclarationMetadata,
    SubscribeMetadata,
};
use crate::features::instrumentation::infrastructure::context::FileContext;
use crate::features::instrumentation::infrastructure::resolver::{
    Binding, ObservableBinding, PipeBinding, Source, SymbolResolver, PIPE_SOURCE,
};
use crate::features::instrumentation::infrastructure::shapes;
use crate::features::parsing::domain::{SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::fields;
use crate::shared::models::{Result, TransformError};
use crate::shared::utils::Identity;

/// Metadata for one match
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub metadata: ConstructMetadata,
    /// Per-operator records of a pipe, in argument order
    pub operators: Vec<PipeableOperatorMetadata>,
    /// Lineage entry to record once the rewrite is applied
    pub binding: Option<(String, Binding)>,
}

impl Synthesis {
    fn new(metadata: ConstructMetadata) -> Self {
        Self {
            metadata,
            operators: Vec::new(),
            binding: None,
        }
    }

    fn bind(mut self, name: Option<String>, binding: Binding) -> Self {
        self.binding = name.map(|name| (name, binding));
        self
    }
}

pub struct MetadataSynthesizer<'a, 't> {
    ctx: &'a FileContext<'t>,
    resolver: &'a SymbolResolver,
}

impl<'a, 't> MetadataSynthesizer<'a, 't> {
    pub fn new(ctx: &'a FileContext<'t>, resolver: &'a SymbolResolver) -> Self {
        Self { ctx, resolver }
    }

    pub fn synthesize(&self, node: &SyntaxNode, kind: ConstructKind) -> Result<Synthesis> {
        match kind {
            ConstructKind::CreationOperator => self.creation(node),
            ConstructKind::JoinCreationOperator => self.join(node),
            ConstructKind::ObjectOrSubjectConstructor => self.constructor(node),
            ConstructKind::Pipe => self.pipe(node),
            ConstructKind::Subscribe => self.subscribe(node),
            ConstructKind::PropertyDeclaration => self.property(node),
            ConstructKind::PipeableOperator | ConstructKind::Unclassified => {
                Err(TransformError::UnknownConstruct(kind))
            }
        }
    }

    fn header(&self, anchor: &SyntaxNode) -> MetadataHeader {
        MetadataHeader::new(self.ctx.identity_of(anchor), &self.ctx.position_of(anchor))
    }

    fn invalid(&self, kind: ConstructKind, node: &SyntaxNode, reason: &str) -> TransformError {
        TransformError::invalid_shape(kind, reason, self.ctx.position_of(node))
    }

    /// Identity of the class field this node initializes
    fn property_declaration(&self, node: &SyntaxNode) -> Option<Identity> {
        self.ctx
            .enclosing_field(node)
            .and_then(|field| field.child_by_field(fields::NAME))
            .map(|name| self.ctx.identity_of(name))
    }

    fn creation(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::CreationOperator;
        let callee = shapes::callee_identifier(node)
            .ok_or_else(|| self.invalid(kind, node, "callee is not an identifier"))?;

        let header = self.header(callee);
        let binding = Binding::Observable(ObservableBinding {
            identity: header.uuid.clone(),
            label: callee.text(),
        });
        let metadata = CreationOperatorMetadata {
            header,
            operator: callee.text(),
            identifier: self.ctx.binding_name_or_anonymous(node),
            property_declaration: self.property_declaration(node),
        };

        Ok(Synthesis::new(ConstructMetadata::CreationOperator(metadata))
            .bind(self.ctx.binding_name(node), binding))
    }

    fn join(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::JoinCreationOperator;
        let callee = shapes::callee_identifier(node)
            .ok_or_else(|| self.invalid(kind, node, "callee is not an identifier"))?;

        let mut observables = Vec::new();
        for argument in shapes::call_arguments(node) {
            self.collect_bases(argument, &mut observables)?;
        }

        let header = self.header(callee);
        let binding = Binding::Observable(ObservableBinding {
            identity: header.uuid.clone(),
            label: callee.text(),
        });
        let metadata = JoinCreationOperatorMetadata {
            header,
            operator: callee.text(),
            identifier: self.ctx.binding_name_or_anonymous(node),
            observables,
            property_declaration: self.property_declaration(node),
        };

        Ok(Synthesis::new(ConstructMetadata::JoinCreationOperator(metadata))
            .bind(self.ctx.binding_name(node), binding))
    }

    /// Streams feeding a join; arrays and object values are flattened and
    /// non-stream arguments (literals, selectors) skipped
    fn collect_bases(&self, argument: &SyntaxNode, out: &mut Vec<BaseObservable>) -> Result<()> {
        let argument = shapes::unwrap_transparent(argument);
        match argument.kind {
            SyntaxKind::ArrayLiteral => {
                for element in &argument.children {
                    self.collect_bases(element, out)?;
                }
            }
            SyntaxKind::ObjectLiteral => {
                for entry in &argument.children {
                    match entry.kind {
                        SyntaxKind::Pair => {
                            if let Some(value) = entry.child_by_field(fields::VALUE) {
                                self.collect_bases(value, out)?;
                            }
                        }
                        SyntaxKind::Identifier => self.collect_bases(entry, out)?,
                        _ => {}
                    }
                }
            }
            SyntaxKind::Literal
            | SyntaxKind::StringLiteral
            | SyntaxKind::FunctionExpr
            | SyntaxKind::SpreadElement => {}
            _ => out.push(self.base_observable(argument)?),
        }
        Ok(())
    }

    fn base_observable(&self, argument: &SyntaxNode) -> Result<BaseObservable> {
        Ok(match self.resolver.resolve_source(argument, self.ctx)? {
            Source::Observable {
                identity,
                identifier,
                label,
            } => BaseObservable {
                uuid: identity,
                identifier,
                kind: label,
            },
            Source::NamedPipe { name, binding } => BaseObservable {
                uuid: binding.pipe,
                identifier: Some(name),
                kind: PIPE_SOURCE.to_string(),
            },
        })
    }

    fn constructor(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::ObjectOrSubjectConstructor;
        let ctor = shapes::constructed_type(node)
            .ok_or_else(|| self.invalid(kind, node, "constructed type is not an identifier"))?;

        let header = self.header(ctor);
        let binding = Binding::Observable(ObservableBinding {
            identity: header.uuid.clone(),
            label: ctor.text(),
        });
        let metadata = ObservableSubjectConstructorMetadata {
            header,
            constructor: ctor.text(),
            identifier: self.ctx.binding_name_or_anonymous(node),
            type_arguments: shapes::type_argument_texts(node.child_by_field(fields::TYPE_ARGUMENTS)),
            property_declaration: self.property_declaration(node),
        };

        Ok(Synthesis::new(ConstructMetadata::ObjectOrSubjectConstructor(metadata))
            .bind(self.ctx.binding_name(node), binding))
    }

    fn pipe(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::Pipe;
        let (object, pipe) = shapes::member_call(node, "pipe")
            .ok_or_else(|| self.invalid(kind, node, "callee is not a `.pipe` member access"))?;

        let operators = shapes::call_arguments(node);
        if let Some(spread) = operators.iter().find(|op| op.kind == SyntaxKind::SpreadElement) {
            return Err(self.invalid(kind, spread, "spread operator arguments cannot be wrapped"));
        }

        let source = self.resolver.resolve_source(object, self.ctx)?;
        let observable = source.observable().clone();
        let upstream = self.resolver.pipe_chain(object, self.ctx);

        let header = self.header(pipe);
        let operator_records = operators
            .iter()
            .enumerate()
            .map(|(index, operator)| PipeableOperatorMetadata {
                header: self.header(operator),
                operator: operator_name(operator),
                function: operator_function(operator),
                observable: observable.clone(),
                pipe: header.uuid.clone(),
                pipes: upstream.clone(),
                operator_position: OperatorPosition::from_index(index, operators.len()),
            })
            .collect();

        let binding = Binding::Pipe(PipeBinding {
            pipe: header.uuid.clone(),
            observable: observable.clone(),
            upstream: upstream.clone(),
        });
        let metadata = PipeMetadata {
            header,
            observable,
            identifier: self.ctx.binding_name_or_anonymous(node),
            pipes: upstream,
        };

        let mut synthesis =
            Synthesis::new(ConstructMetadata::Pipe(metadata)).bind(self.ctx.binding_name(node), binding);
        synthesis.operators = operator_records;
        Ok(synthesis)
    }

    fn subscribe(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::Subscribe;
        let (object, _) = shapes::member_call(node, "subscribe")
            .ok_or_else(|| self.invalid(kind, node, "callee is not a `.subscribe` member access"))?;

        let source = self.resolver.resolve_source(object, self.ctx)?;
        let metadata = SubscribeMetadata {
            header: self.header(node),
            observable: source.observable().clone(),
            pipes: self.resolver.pipe_chain(object, self.ctx),
        };

        Ok(Synthesis::new(ConstructMetadata::Subscribe(metadata)))
    }

    fn property(&self, node: &SyntaxNode) -> Result<Synthesis> {
        let kind = ConstructKind::PropertyDeclaration;
        let name = node
            .child_by_field(fields::NAME)
            .ok_or_else(|| self.invalid(kind, node, "field has no name"))?;
        let (type_name, type_arguments) = shapes::field_type(node)
            .ok_or_else(|| self.invalid(kind, node, "field has no Observable or Subject type"))?;

        let header = self.header(name);
        let binding = Binding::Observable(ObservableBinding {
            identity: header.uuid.clone(),
            label: type_name.text(),
        });
        let metadata = PropertyDeclarationMetadata {
            header,
            identifier: name.text(),
            kind: type_name.text(),
            type_arguments: shapes::type_argument_texts(type_arguments),
        };

        Ok(Synthesis::new(ConstructMetadata::PropertyDeclaration(metadata))
            .bind(Some(name.text()), binding))
    }
}

/// `map` for `map(f)`, the expression itself for operator references
fn operator_name(operator: &SyntaxNode) -> String {
    match operator.kind {
        SyntaxKind::CallExpr => operator
            .child_by_field(fields::FUNCTION)
            .map(SyntaxNode::text)
            .unwrap_or_else(|| operator.text()),
        _ => operator.text(),
    }
}

/// Argument source text of an operator call
fn operator_function(operator: &SyntaxNode) -> String {
    match operator.kind {
        SyntaxKind::CallExpr => shapes::call_arguments(operator)
            .iter()
            .map(SyntaxNode::text)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
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

    fn find<'t>(tree: &'t ParsedTree, pred: impl Fn(&SyntaxNode) -> bool) -> &'t SyntaxNode {
        let mut stack = vec![&tree.root];
        while let Some(node) = stack.pop() {
            if pred(node) {
                return node;
            }
            stack.extend(node.children.iter().rev());
        }
        panic!("node not found");
    }

    #[test]
    fn test_join_bases_are_anonymous() {
        let tree = parse("merge(interval(100), of('x'));");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let call = find(&tree, |n| shapes::callee_identifier(n).map(|c| c.text()) == Some("merge".into()));

        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(call, ConstructKind::JoinCreationOperator)
            .unwrap();
        let ConstructMetadata::JoinCreationOperator(metadata) = synthesis.metadata else {
            panic!("expected join metadata");
        };

        assert_eq!(metadata.observables.len(), 2);
        assert!(metadata.observables.iter().all(|o| o.identifier.is_none()));
        assert_eq!(metadata.observables[0].kind, "interval");
        assert_eq!(metadata.observables[1].kind, "of");
        assert_eq!(metadata.identifier, "anonymous");
        assert!(synthesis.binding.is_none());
    }

    #[test]
    fn test_join_flattens_arrays_and_skips_selectors() {
        let tree = parse("combineLatest([a$, b$], (a, b) => a + b);");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let call = find(&tree, |n| n.kind == SyntaxKind::CallExpr);

        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(call, ConstructKind::JoinCreationOperator)
            .unwrap();
        let ConstructMetadata::JoinCreationOperator(metadata) = synthesis.metadata else {
            panic!("expected join metadata");
        };
        let names: Vec<Option<String>> =
            metadata.observables.iter().map(|o| o.identifier.clone()).collect();
        assert_eq!(names, vec![Some("a$".to_string()), Some("b$".to_string())]);
    }

    #[test]
    fn test_operator_positions_and_text() {
        let tree = parse("const s$ = source$.pipe(map(f), filter(g), map(h));");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let call = find(&tree, |n| shapes::member_call(n, "pipe").is_some());

        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(call, ConstructKind::Pipe)
            .unwrap();
        let positions: Vec<OperatorPosition> =
            synthesis.operators.iter().map(|o| o.operator_position).collect();
        assert_eq!(
            positions,
            vec![OperatorPosition::First, OperatorPosition::Middle, OperatorPosition::Last]
        );
        assert_eq!(synthesis.operators[1].operator, "filter");
        assert_eq!(synthesis.operators[1].function, "g");
        assert!(synthesis
            .operators
            .iter()
            .all(|o| &o.pipe == synthesis.metadata.uuid()));
        assert!(matches!(synthesis.binding, Some((ref name, Binding::Pipe(_))) if name == "s$"));
    }

    #[test]
    fn test_spread_operators_rejected() {
        let tree = parse("source$.pipe(...operators);");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let call = find(&tree, |n| shapes::member_call(n, "pipe").is_some());

        let error = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(call, ConstructKind::Pipe)
            .unwrap_err();
        assert!(matches!(error, TransformError::InvalidNodeShape { kind: ConstructKind::Pipe, .. }));
    }

    #[test]
    fn test_constructor_in_field_links_property() {
        let tree = parse("class A {\n  s$ = new ReplaySubject<string>(1);\n}\n");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let new_expr = find(&tree, |n| n.kind == SyntaxKind::NewExpr);

        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(new_expr, ConstructKind::ObjectOrSubjectConstructor)
            .unwrap();
        let ConstructMetadata::ObjectOrSubjectConstructor(metadata) = synthesis.metadata else {
            panic!("expected constructor metadata");
        };
        assert_eq!(metadata.constructor, "ReplaySubject");
        assert_eq!(metadata.identifier, "s$");
        assert_eq!(metadata.type_arguments, vec!["string".to_string()]);
        assert!(metadata.property_declaration.is_some());
    }

    #[test]
    fn test_unknown_construct() {
        let tree = parse("f();");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();

        let error = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(&tree.root, ConstructKind::PipeableOperator)
            .unwrap_err();
        assert!(matches!(error, TransformError::UnknownConstruct(ConstructKind::PipeableOperator)));
    }
}
