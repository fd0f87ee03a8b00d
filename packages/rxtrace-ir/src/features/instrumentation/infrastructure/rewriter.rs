//! Rewriter
//!
//! Builds the replacement of a classified node: the original expression
//! wrapped in curried wrapper calls carrying the metadata literal.
//!
//! ```text
//! of(1)                  => wrapCreationOperator(meta)(of)(1)
//! new Subject<T>()       => wrapObservableSubjectConstructor(meta)(new Subject<T>())
//! a$.pipe(map(f))        => wrapPipe(meta)(a$)(wrapPipeableOperator(opMeta)(map(f)))
//! a$.subscribe(f)        => wrapSubscribe(meta)(a$)(f)
//! s$: Subject<T> = x     => s$: Subject<T> = wrapPropertyDeclaration(meta)(x)
//! ```
//!
//! The input node is never modified. Every node built here is synthetic
//! (no span) and its id is reported in [`Rewrite::introduced`]; original
//! subtrees are moved into the replacement unchanged.

use crate::features::instrumentation::domain::{
    ConstructKind, ConstructMetadata, PipeableOperatorMetadata, WRAP_PIPE, WRAP_PIPEABLE_OPERATOR,
    WRAP_PROPERTY_DECLARATION, WRAP_SUBSCRIBE,
};
use crate::features::instrumentation::infrastructure::synthesizer::Synthesis;
use crate::features::parsing::domain::{NodeId, SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::{
    fields, node_kinds,
};
use crate::shared::models::{Result, SourcePosition, Span, TransformError};

/// Replacement node and the ids of the nodes synthesized for it
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub node: SyntaxNode,
    pub introduced: Vec<NodeId>,
}

/// Allocates synthetic ids above the parsed tree's id range
#[derive(Debug)]
pub struct Rewriter {
    file: String,
    next_id: u32,
    introduced: Vec<NodeId>,
}

impl Rewriter {
    pub fn new(file: impl Into<String>, first_free: NodeId) -> Self {
        Self {
            file: file.into(),
            next_id: first_free.0,
            introduced: Vec::new(),
        }
    }

    pub fn rewrite(
        &mut self,
        node: &SyntaxNode,
        kind: ConstructKind,
        synthesis: &Synthesis,
    ) -> Result<Rewrite> {
        self.introduced.clear();
        let wrapper = kind
            .wrapper_name()
            .ok_or(TransformError::UnknownConstruct(kind))?;
        let literal = synthesis.metadata.to_literal()?;

        let mut replacement = match kind {
            ConstructKind::CreationOperator | ConstructKind::JoinCreationOperator => {
                self.wrap_callee(node, kind, wrapper, literal)?
            }
            ConstructKind::ObjectOrSubjectConstructor => self.curried(wrapper, literal, node.clone()),
            ConstructKind::Pipe => self.wrap_pipe(node, literal, &synthesis.operators)?,
            ConstructKind::Subscribe => self.wrap_receiver(node, kind, WRAP_SUBSCRIBE, literal)?,
            ConstructKind::PropertyDeclaration => self.wrap_property(node, literal),
            ConstructKind::PipeableOperator | ConstructKind::Unclassified => {
                return Err(TransformError::UnknownConstruct(kind));
            }
        };
        replacement.field = node.field;

        Ok(Rewrite {
            node: replacement,
            introduced: std::mem::take(&mut self.introduced),
        })
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.introduced.push(id);
        id
    }

    fn identifier(&mut self, name: &str) -> SyntaxNode {
        let id = self.next_id();
        SyntaxNode::synthetic_leaf(id, node_kinds::IDENTIFIER, name)
    }

    fn metadata_literal(&mut self, literal: String) -> SyntaxNode {
        let id = self.next_id();
        SyntaxNode::synthetic_leaf(id, node_kinds::OBJECT, literal)
    }

    /// `(a, b, …)`
    fn arguments(&mut self, args: Vec<SyntaxNode>) -> SyntaxNode {
        let gaps = if args.is_empty() {
            vec!["()".to_string()]
        } else {
            let mut gaps = Vec::with_capacity(args.len() + 1);
            gaps.push("(".to_string());
            gaps.extend(std::iter::repeat(", ".to_string()).take(args.len() - 1));
            gaps.push(")".to_string());
            gaps
        };
        let args = args.into_iter().map(detach_field).collect();
        let id = self.next_id();
        SyntaxNode::synthetic(id, node_kinds::ARGUMENTS, args, gaps)
    }

    /// `function(args…)`
    fn call(&mut self, function: SyntaxNode, arguments: SyntaxNode) -> SyntaxNode {
        let id = self.next_id();
        SyntaxNode::synthetic(
            id,
            node_kinds::CALL_EXPRESSION,
            vec![
                function.with_field(fields::FUNCTION),
                arguments.with_field(fields::ARGUMENTS),
            ],
            vec![String::new(), String::new(), String::new()],
        )
    }

    /// `wrapper(literal)(inner)`
    fn curried(&mut self, wrapper: &str, literal: String, inner: SyntaxNode) -> SyntaxNode {
        let wrapper = self.identifier(wrapper);
        let literal = self.metadata_literal(literal);
        let metadata_args = self.arguments(vec![literal]);
        let with_metadata = self.call(wrapper, metadata_args);
        let inner_args = self.arguments(vec![inner]);
        self.call(with_metadata, inner_args)
    }

    /// Copy of `node` under a fresh synthetic id
    fn detached(&mut self, node: &SyntaxNode) -> SyntaxNode {
        let mut copy = node.clone();
        copy.id = self.next_id();
        copy.span = None;
        copy
    }

    /// `of(1)` → `wrapper(meta)(of)(1)`
    fn wrap_callee(
        &mut self,
        call: &SyntaxNode,
        kind: ConstructKind,
        wrapper: &str,
        literal: String,
    ) -> Result<SyntaxNode> {
        let index = call
            .child_index_by_field(fields::FUNCTION)
            .filter(|_| call.kind == SyntaxKind::CallExpr)
            .ok_or_else(|| self.shape_error(kind, call, "call without a callee"))?;

        let mut replacement = self.detached(call);
        let callee = replacement.children[index].clone();
        let wrapped = self.curried(wrapper, literal, callee);
        replacement.replace_child(index, wrapped);
        Ok(replacement)
    }

    /// `a$.method(args)` → `wrapper(meta)(a$)(args)`
    fn wrap_receiver(
        &mut self,
        call: &SyntaxNode,
        kind: ConstructKind,
        wrapper: &str,
        literal: String,
    ) -> Result<SyntaxNode> {
        let index = call
            .child_index_by_field(fields::FUNCTION)
            .ok_or_else(|| self.shape_error(kind, call, "call without a callee"))?;
        let receiver = call.children[index]
            .child_by_field(fields::OBJECT)
            .filter(|_| call.children[index].kind == SyntaxKind::MemberExpr)
            .cloned()
            .ok_or_else(|| self.shape_error(kind, call, "callee is not a member access"))?;

        let mut replacement = self.detached(call);
        let wrapped = self.curried(wrapper, literal, receiver);
        replacement.replace_child(index, wrapped);
        Ok(replacement)
    }

    fn wrap_pipe(
        &mut self,
        call: &SyntaxNode,
        literal: String,
        operators: &[PipeableOperatorMetadata],
    ) -> Result<SyntaxNode> {
        let kind = ConstructKind::Pipe;
        let mut replacement = self.wrap_receiver(call, kind, WRAP_PIPE, literal)?;

        let index = replacement
            .child_index_by_field(fields::ARGUMENTS)
            .ok_or_else(|| self.shape_error(kind, call, "call without arguments"))?;
        if replacement.children[index].children.len() != operators.len() {
            return Err(self.shape_error(kind, call, "operator metadata does not match the arguments"));
        }

        // the argument list keeps its own separators, comments and trailing comma
        let mut arguments = self.detached(&replacement.children[index]);
        for (position, metadata) in operators.iter().enumerate() {
            let literal = ConstructMetadata::PipeableOperator(metadata.clone()).to_literal()?;
            let operator = detach_field(arguments.children[position].clone());
            let wrapped = self.curried(WRAP_PIPEABLE_OPERATOR, literal, operator);
            arguments.replace_child(position, wrapped);
        }
        replacement.replace_child(index, arguments);
        Ok(replacement)
    }

    /// Wrap the initializer, or add one wrapping `undefined`
    fn wrap_property(&mut self, field: &SyntaxNode, literal: String) -> SyntaxNode {
        let mut replacement = self.detached(field);
        match replacement.child_index_by_field(fields::VALUE) {
            Some(index) => {
                let value = replacement.children[index].clone();
                let wrapped = self.curried(WRAP_PROPERTY_DECLARATION, literal, value);
                replacement.replace_child(index, wrapped);
            }
            None => {
                let undefined = self.identifier("undefined");
                let wrapped = self
                    .curried(WRAP_PROPERTY_DECLARATION, literal, undefined)
                    .with_field(fields::VALUE);
                replacement.push_child(" = ", wrapped);
            }
        }
        replacement
    }

    fn shape_error(&self, kind: ConstructKind, node: &SyntaxNode, reason: &str) -> TransformError {
        let span = node.span.unwrap_or_else(Span::zero);
        TransformError::invalid_shape(kind, reason, SourcePosition::from_span(self.file.as_str(), &span))
    }
}

fn detach_field(mut node: SyntaxNode) -> SyntaxNode {
    node.field = None;
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::infrastructure::context::FileContext;
    use crate::features::instrumentation::infrastructure::resolver::SymbolResolver;
    use crate::features::instrumentation::infrastructure::synthesizer::MetadataSynthesizer;
    use crate::features::parsing::domain::ParsedTree;
    use crate::features::parsing::{Parser, TreeSitterParser};
    use crate::shared::utils::IdentityGenerator;

    fn parse(source: &str) -> ParsedTree {
        TreeSitterParser::typescript().parse(source, "a.ts").unwrap()
    }

    fn first<'t>(tree: &'t ParsedTree, pred: impl Fn(&SyntaxNode) -> bool) -> &'t SyntaxNode {
        let mut stack = vec![&tree.root];
        while let Some(node) = stack.pop() {
            if pred(node) {
                return node;
            }
            stack.extend(node.children.iter().rev());
        }
        panic!("node not found");
    }

    fn rewrite(tree: &ParsedTree, node: &SyntaxNode, kind: ConstructKind) -> (Rewrite, String) {
        let ctx = FileContext::new(tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(node, kind)
            .unwrap();
        let literal = synthesis.metadata.to_literal().unwrap();
        let rewrite = Rewriter::new(tree.file_path.as_str(), tree.next_node_id())
            .rewrite(node, kind, &synthesis)
            .unwrap();
        (rewrite, literal)
    }

    #[test]
    fn test_creation_keeps_arguments() {
        let tree = parse("const a$ = of(1, sideEffect());");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr);
        let (rewrite, literal) = rewrite(&tree, call, ConstructKind::CreationOperator);

        assert_eq!(
            rewrite.node.render(),
            format!("wrapCreationOperator({literal})(of)(1, sideEffect())")
        );
        assert_eq!(rewrite.node.field, Some(fields::VALUE));
        assert!(rewrite.node.is_synthetic());
    }

    #[test]
    fn test_constructor_wraps_whole_expression() {
        let tree = parse("const s = new Subject<number>();");
        let new_expr = first(&tree, |n| n.kind == SyntaxKind::NewExpr);
        let (rewrite, literal) = rewrite(&tree, new_expr, ConstructKind::ObjectOrSubjectConstructor);

        assert_eq!(
            rewrite.node.render(),
            format!("wrapObservableSubjectConstructor({literal})(new Subject<number>())")
        );
    }

    #[test]
    fn test_pipe_wraps_each_operator() {
        let tree = parse("a$.pipe(map(f), take(1));");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr);
        let (rewrite, literal) = rewrite(&tree, call, ConstructKind::Pipe);
        let rendered = rewrite.node.render();

        assert!(rendered.starts_with(&format!("wrapPipe({literal})(a$)(wrapPipeableOperator(")));
        assert!(rendered.contains(")(map(f)), wrapPipeableOperator("));
        assert!(rendered.ends_with(")(take(1)))"));
        assert!(rendered.contains("\"operatorPosition\":\"first\""));
        assert!(rendered.contains("\"operatorPosition\":\"last\""));
    }

    #[test]
    fn test_pipe_keeps_argument_layout() {
        let tree = parse("a$.pipe(\n  map(f), // double\n  take(1),\n);");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr && n.text().starts_with("a$"));
        let (rewrite, _) = rewrite(&tree, call, ConstructKind::Pipe);
        let rendered = rewrite.node.render();

        assert!(rendered.contains(")(a$)(\n  wrapPipeableOperator("));
        assert!(rendered.contains(")(map(f)), // double\n  wrapPipeableOperator("));
        assert!(rendered.ends_with(")(take(1)),\n)"));
    }

    #[test]
    fn test_subscribe_keeps_observer() {
        let tree = parse("a$.subscribe(x => log(x));");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr);
        let (rewrite, literal) = rewrite(&tree, call, ConstructKind::Subscribe);

        assert_eq!(
            rewrite.node.render(),
            format!("wrapSubscribe({literal})(a$)(x => log(x))")
        );
    }

    #[test]
    fn test_property_without_initializer() {
        let tree = parse("class A {\n  s$: Subject<number>;\n}\n");
        let field = first(&tree, |n| n.kind == SyntaxKind::FieldDefinition);
        let (rewrite, literal) = rewrite(&tree, field, ConstructKind::PropertyDeclaration);

        assert_eq!(
            rewrite.node.render(),
            format!("s$: Subject<number> = wrapPropertyDeclaration({literal})(undefined)")
        );
    }

    #[test]
    fn test_introduced_ids_are_fresh() {
        let tree = parse("of(1);");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr);
        let (rewrite, _) = rewrite(&tree, call, ConstructKind::CreationOperator);

        assert!(!rewrite.introduced.is_empty());
        assert!(rewrite.introduced.iter().all(|id| id.0 >= tree.node_count));

        // the original callee moved into the wrapper with its id intact
        let callee = call.child_by_field(fields::FUNCTION).unwrap();
        let moved = rewrite.node.children[0].children[1].children[0].clone();
        assert_eq!(moved.id, callee.id);
        assert!(!rewrite.introduced.contains(&moved.id));
        assert_eq!(moved.render(), "of");
    }

    #[test]
    fn test_operator_kind_has_no_handler() {
        let tree = parse("of(1);");
        let call = first(&tree, |n| n.kind == SyntaxKind::CallExpr);
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let resolver = SymbolResolver::new();
        let synthesis = MetadataSynthesizer::new(&ctx, &resolver)
            .synthesize(call, ConstructKind::CreationOperator)
            .unwrap();

        let error = Rewriter::new(tree.file_path.as_str(), tree.next_node_id())
            .rewrite(call, ConstructKind::Unclassified, &synthesis)
            .unwrap_err();
        assert!(matches!(error, TransformError::UnknownConstruct(ConstructKind::Unclassified)));
    }
}
