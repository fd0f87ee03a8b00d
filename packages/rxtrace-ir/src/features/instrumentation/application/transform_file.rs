//! Traversal driver
//!
//! One pre-order, depth-first pass over a parsed file. At each node the
//! classifier is asked for a verdict; a match is synthesized and rewritten,
//! the replacement substituted, and traversal continues into the children of
//! the replacement. Wrapper layers are synthetic and their ids are marked
//! touched, so only the original subtrees moved into them can match again.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::config::ValidatedConfig;
use crate::features::instrumentation::domain::{
    ConstructKind, ConstructMetadata, Dependency, Diagnostic, InstrumentedConstruct,
};
use crate::features::instrumentation::infrastructure::{
    Classification, Classifier, DependencyTracker, FileContext, MetadataSynthesizer, Rewriter,
    SymbolResolver,
};
use crate::features::parsing::domain::{NodeId, ParsedTree, SyntaxNode};
use crate::shared::models::Result;

/// Result of rewriting one file
#[derive(Debug, Clone)]
pub struct FileTransform {
    /// Rewritten tree (equal to the input tree when nothing matched)
    pub root: SyntaxNode,

    /// Wrapper imports the rewritten tree needs, in import order
    pub dependencies: Vec<Dependency>,

    /// Matched nodes that were left unrewritten
    pub diagnostics: Vec<Diagnostic>,

    /// Every rewrite, in traversal order; pipe operators follow their pipe
    pub constructs: Vec<InstrumentedConstruct>,

    pub transformed: bool,
}

/// Rewrite every recognized construct of `tree`
///
/// Node-local failures are reported as diagnostics. Any other error aborts
/// the file and is returned; the input tree is never modified.
pub fn transform_file(tree: &ParsedTree, config: &ValidatedConfig) -> Result<FileTransform> {
    let ctx = FileContext::new(tree, config.identity_generator());
    let mut traversal = Traversal {
        ctx: &ctx,
        classifier: Classifier::new(config.wrapper_location.as_str()),
        resolver: SymbolResolver::new(),
        rewriter: Rewriter::new(tree.file_path.as_str(), tree.next_node_id()),
        dependencies: DependencyTracker::new(
            config.wrapper_location.as_str(),
            config.telemetry_sink.as_str(),
        ),
        touched: FxHashSet::default(),
        diagnostics: Vec::new(),
        constructs: Vec::new(),
    };

    let root = traversal.visit(&tree.root)?;
    let transformed = !traversal.constructs.is_empty();

    Ok(FileTransform {
        root,
        dependencies: traversal.dependencies.finalize(),
        diagnostics: traversal.diagnostics,
        constructs: traversal.constructs,
        transformed,
    })
}

struct Traversal<'a, 't> {
    ctx: &'a FileContext<'t>,
    classifier: Classifier,
    resolver: SymbolResolver,
    rewriter: Rewriter,
    dependencies: DependencyTracker,
    touched: FxHashSet<NodeId>,
    diagnostics: Vec<Diagnostic>,
    constructs: Vec<InstrumentedConstruct>,
}

impl Traversal<'_, '_> {
    fn visit(&mut self, node: &SyntaxNode) -> Result<SyntaxNode> {
        match self.dispatch(node)? {
            Some(replacement) => replacement.try_map_children(|child| self.visit(child)),
            None => node.try_map_children(|child| self.visit(child)),
        }
    }

    /// Replacement for `node`, or `None` to keep it
    ///
    /// Matching runs against the original node: an original subtree moved
    /// into a wrapper layer has lost its field name, not its position.
    fn dispatch(&mut self, node: &SyntaxNode) -> Result<Option<SyntaxNode>> {
        let ctx = self.ctx;
        let Some(original) = ctx.index.get(node.id).filter(|_| !node.is_synthetic()) else {
            return Ok(None);
        };

        let classification = self.classifier.classify(original, ctx, &self.touched);
        if !classification.kind.is_classified() {
            return Ok(None);
        }
        self.touched.insert(node.id);

        match self.instrument(original, classification) {
            Ok(mut replacement) => {
                replacement.field = node.field;
                Ok(Some(replacement))
            }
            Err(error) if error.is_recoverable() => {
                warn!("{}: left unrewritten: {}", self.ctx.file, error);
                self.diagnostics.extend(Diagnostic::from_error(&error));
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Synthesize and rewrite; pass state changes only once both succeed
    fn instrument(&mut self, node: &SyntaxNode, classification: Classification) -> Result<SyntaxNode> {
        let kind = classification.kind;
        let synthesis = MetadataSynthesizer::new(self.ctx, &self.resolver).synthesize(node, kind)?;
        let rewrite = self.rewriter.rewrite(node, kind, &synthesis)?;

        debug!(
            "{}: {} at {}",
            self.ctx.file,
            kind,
            self.ctx.position_of(node)
        );

        if let Some(dependency) = classification.dependency {
            self.dependencies.record(dependency);
        }
        if let Some((name, binding)) = synthesis.binding {
            self.resolver.record_binding(name, binding);
        }
        self.touched.extend(rewrite.introduced);

        self.constructs.push(InstrumentedConstruct {
            kind,
            metadata: synthesis.metadata,
        });
        self.constructs
            .extend(synthesis.operators.into_iter().map(|operator| InstrumentedConstruct {
                kind: ConstructKind::PipeableOperator,
                metadata: ConstructMetadata::PipeableOperator(operator),
            }));

        Ok(rewrite.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::domain::DiagnosticKind;
    use crate::features::parsing::{Parser, TreeSitterParser};

    fn transform(source: &str) -> FileTransform {
        let tree = TreeSitterParser::typescript().parse(source, "a.ts").unwrap();
        transform_file(&tree, &ValidatedConfig::default()).unwrap()
    }

    fn kinds(result: &FileTransform) -> Vec<ConstructKind> {
        result.constructs.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_untouched_file_is_identical() {
        let source = "const x = 1;\nconsole.log(x);\n";
        let result = transform(source);
        assert!(!result.transformed);
        assert!(result.dependencies.is_empty());
        assert_eq!(result.root.render(), source);
    }

    #[test]
    fn test_nested_constructs_are_all_rewritten() {
        let result = transform("merge(of(1), interval(10)).pipe(map(x => x)).subscribe();\n");
        assert_eq!(
            kinds(&result),
            vec![
                ConstructKind::Subscribe,
                ConstructKind::Pipe,
                ConstructKind::PipeableOperator,
                ConstructKind::JoinCreationOperator,
                ConstructKind::CreationOperator,
                ConstructKind::CreationOperator,
            ]
        );
        let output = result.root.render();
        assert!(output.starts_with("wrapSubscribe("));
        assert_eq!(output.matches("wrapCreationOperator(").count(), 2);
    }

    #[test]
    fn test_lineage_links_pipe_to_creation() {
        let result = transform("const a$ = of(1);\nconst b$ = a$.pipe(map(x => x));\n");
        let creation = result.constructs[0].metadata.uuid().clone();
        let ConstructMetadata::Pipe(pipe) = &result.constructs[1].metadata else {
            panic!("expected pipe metadata");
        };
        assert_eq!(pipe.observable, creation);
        assert_eq!(pipe.identifier, "b$");
    }

    #[test]
    fn test_unresolved_source_is_reported_and_skipped() {
        let source = "late$.subscribe();\nconst late$ = load();\n";
        let result = transform(source);
        assert!(!result.transformed);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnresolvedSource);
        assert_eq!(result.diagnostics[0].line, 1);
        assert_eq!(result.root.render(), source);
    }

    #[test]
    fn test_invalid_pipe_keeps_inner_constructs() {
        let result = transform("of(1).pipe(...ops);\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(kinds(&result), vec![ConstructKind::CreationOperator]);
        assert!(result
            .root
            .render()
            .ends_with(")(of)(1).pipe(...ops);\n"));
    }

    #[test]
    fn test_constructor_is_not_rewrapped() {
        let result = transform("const s = new Subject<number>();\n");
        assert_eq!(kinds(&result), vec![ConstructKind::ObjectOrSubjectConstructor]);
        assert_eq!(
            result.root.render().matches("wrapObservableSubjectConstructor(").count(),
            1
        );
    }
}
