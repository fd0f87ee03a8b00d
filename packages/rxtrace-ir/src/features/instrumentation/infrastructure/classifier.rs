//! Pattern classifier
//!
//! An ordered rule list evaluated first-match-wins. The order is:
//!
//! 1. CreationOperator
//! 2. JoinCreationOperator
//! 3. ObjectOrSubjectConstructor
//! 4. Pipe
//! 5. Subscribe
//! 6. PropertyDeclaration
//!
//! Nodes already matched or produced by a rewrite are never classified again.

use rustc_hash::FxHashSet;

use crate::features::instrumentation::domain::{ConstructKind, Dependency};
use crate::features::instrumentation::infrastructure::context::FileContext;
use crate::features::instrumentation::infrastructure::operators::{
    is_creation_operator, is_join_creation_operator, is_stream_type,
};
use crate::features::instrumentation::infrastructure::shapes;
use crate::features::parsing::domain::{NodeId, SyntaxNode};

/// Classifier verdict for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ConstructKind,
    /// Wrapper function the rewrite of this node will call
    pub dependency: Option<Dependency>,
}

impl Classification {
    pub fn unclassified() -> Self {
        Self {
            kind: ConstructKind::Unclassified,
            dependency: None,
        }
    }
}

type Predicate = fn(&SyntaxNode, &FileContext<'_>) -> bool;

struct Rule {
    kind: ConstructKind,
    matches: Predicate,
}

const RULES: [Rule; 6] = [
    Rule {
        kind: ConstructKind::CreationOperator,
        matches: is_creation_call,
    },
    Rule {
        kind: ConstructKind::JoinCreationOperator,
        matches: is_join_creation_call,
    },
    Rule {
        kind: ConstructKind::ObjectOrSubjectConstructor,
        matches: is_stream_constructor,
    },
    Rule {
        kind: ConstructKind::Pipe,
        matches: is_pipe_call,
    },
    Rule {
        kind: ConstructKind::Subscribe,
        matches: is_subscribe_call,
    },
    Rule {
        kind: ConstructKind::PropertyDeclaration,
        matches: is_stream_property,
    },
];

fn is_creation_call(node: &SyntaxNode, ctx: &FileContext<'_>) -> bool {
    shapes::callee_identifier(node)
        .and_then(SyntaxNode::leaf_text)
        .map(|name| is_creation_operator(name) && ctx.declarations.is_rxjs_binding(name))
        .unwrap_or(false)
}

fn is_join_creation_call(node: &SyntaxNode, ctx: &FileContext<'_>) -> bool {
    shapes::callee_identifier(node)
        .and_then(SyntaxNode::leaf_text)
        .map(|name| is_join_creation_operator(name) && ctx.declarations.is_rxjs_binding(name))
        .unwrap_or(false)
}

fn is_stream_constructor(node: &SyntaxNode, ctx: &FileContext<'_>) -> bool {
    shapes::constructed_type(node)
        .and_then(SyntaxNode::leaf_text)
        .map(|name| is_stream_type(name) && ctx.declarations.is_rxjs_binding(name))
        .unwrap_or(false)
}

fn is_pipe_call(node: &SyntaxNode, _ctx: &FileContext<'_>) -> bool {
    shapes::member_call(node, "pipe").is_some()
}

fn is_subscribe_call(node: &SyntaxNode, _ctx: &FileContext<'_>) -> bool {
    shapes::member_call(node, "subscribe").is_some()
}

fn is_stream_property(node: &SyntaxNode, _ctx: &FileContext<'_>) -> bool {
    shapes::is_initializable(node)
        && shapes::field_type(node)
            .map(|(name, _)| is_stream_type(&name.text()))
            .unwrap_or(false)
}

/// First-match-wins classifier over the fixed rule list
#[derive(Debug, Clone)]
pub struct Classifier {
    wrapper_location: String,
}

impl Classifier {
    pub fn new(wrapper_location: impl Into<String>) -> Self {
        Self {
            wrapper_location: wrapper_location.into(),
        }
    }

    pub fn classify(
        &self,
        node: &SyntaxNode,
        ctx: &FileContext<'_>,
        touched: &FxHashSet<NodeId>,
    ) -> Classification {
        if node.is_synthetic() || touched.contains(&node.id) {
            return Classification::unclassified();
        }

        RULES
            .iter()
            .find(|rule| (rule.matches)(node, ctx))
            .map(|rule| Classification {
                kind: rule.kind,
                dependency: rule
                    .kind
                    .wrapper_name()
                    .map(|wrapper| Dependency::new(wrapper, self.wrapper_location.as_str())),
            })
            .unwrap_or_else(Classification::unclassified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::domain::{ParsedTree, SyntaxKind};
    use crate::features::parsing::{Parser, TreeSitterParser};
    use crate::shared::utils::IdentityGenerator;

    const LOCATION: &str = "rxjs-transformer/dist/rxjs_wrapper";

    fn parse(source: &str) -> ParsedTree {
        TreeSitterParser::typescript().parse(source, "a.ts").unwrap()
    }

    /// Kinds of every classified node, in pre-order
    fn classify_all(source: &str) -> Vec<(ConstructKind, String)> {
        let tree = parse(source);
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let classifier = Classifier::new(LOCATION);
        let touched = FxHashSet::default();

        let mut out = Vec::new();
        let mut stack = vec![&tree.root];
        while let Some(node) = stack.pop() {
            let classification = classifier.classify(node, &ctx, &touched);
            if classification.kind.is_classified() {
                out.push((classification.kind, node.text()));
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    #[test]
    fn test_creation_and_join() {
        let kinds = classify_all("const a$ = of(1);\nconst b$ = merge(a$, interval(10));\n");
        assert_eq!(
            kinds,
            vec![
                (ConstructKind::CreationOperator, "of(1)".to_string()),
                (ConstructKind::JoinCreationOperator, "merge(a$, interval(10))".to_string()),
                (ConstructKind::CreationOperator, "interval(10)".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclassified_passthrough() {
        assert!(classify_all("console.log(100);").is_empty());
    }

    #[test]
    fn test_shadowed_operator_not_matched() {
        let kinds = classify_all("const of = (x: number) => [x];\nconst a = of(1);\n");
        assert!(kinds.is_empty());

        let kinds = classify_all("import { of } from 'rxjs';\nconst a = of(1);\n");
        assert_eq!(kinds.len(), 1);
    }

    #[test]
    fn test_pipe_subscribe_constructor_property() {
        let kinds = classify_all(
            "class A {\n  s$: Subject<number> = new Subject<number>();\n  run() { this.s$.pipe(map(x => x)).subscribe(); }\n}\n",
        );
        let only_kinds: Vec<ConstructKind> = kinds.into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            only_kinds,
            vec![
                ConstructKind::PropertyDeclaration,
                ConstructKind::ObjectOrSubjectConstructor,
                ConstructKind::Subscribe,
                ConstructKind::Pipe,
            ]
        );
    }

    #[test]
    fn test_dependency_reported() {
        let tree = parse("a$.pipe(map(x => x));");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let call = tree.root.find_descendant(&SyntaxKind::CallExpr).unwrap();

        let classification = Classifier::new(LOCATION).classify(call, &ctx, &FxHashSet::default());
        assert_eq!(classification.kind, ConstructKind::Pipe);
        assert_eq!(classification.dependency, Some(Dependency::new("wrapPipe", LOCATION)));
    }

    #[test]
    fn test_touched_and_synthetic_are_unclassified() {
        let tree = parse("of(1);");
        let ctx = FileContext::new(&tree, IdentityGenerator::default());
        let call = tree.root.find_descendant(&SyntaxKind::CallExpr).unwrap();
        let classifier = Classifier::new(LOCATION);

        let mut touched = FxHashSet::default();
        assert!(classifier.classify(call, &ctx, &touched).kind.is_classified());
        touched.insert(call.id);
        assert_eq!(classifier.classify(call, &ctx, &touched), Classification::unclassified());

        let mut synthetic = call.clone();
        synthetic.span = None;
        assert!(!classifier
            .classify(&synthetic, &ctx, &FxHashSet::default())
            .kind
            .is_classified());
    }

    #[test]
    fn test_optional_chain_and_non_stream_fields_ignored() {
        assert!(classify_all("a$?.subscribe();").is_empty());
        assert!(classify_all("class A { count: number = 0; items: Promise<void>; }").is_empty());
    }
}
