use rustc_hash::FxHashSet;

use crate::features::instrumentation::domain::Dependency;
use crate::features::instrumentation::infrastructure::declarations::import_module;
use crate::features::parsing::domain::{NodeId, SyntaxKind, SyntaxNode};
use crate::features::parsing::infrastructure::tree_sitter::languages::typescript::{
    fields, node_kinds,
};

/// Named imports already present in the file, as `(imported name, module)`
///
/// `import { a, b as c } from 'm'` yields `a from m` and `b from m`; default
/// and namespace imports are not named imports and are skipped.
pub fn existing_imports(root: &SyntaxNode) -> Vec<Dependency> {
    let mut imports = Vec::new();

    for statement in root.find_children(&SyntaxKind::ImportStatement) {
        let Some(module) = statement
            .child_by_field(fields::SOURCE)
            .map(|source| import_module(&source.text()))
        else {
            continue;
        };
        let specifiers = statement
            .find_children(&SyntaxKind::ImportClause)
            .into_iter()
            .flat_map(|clause| clause.find_children(&SyntaxKind::NamedImports))
            .flat_map(|named| named.find_children(&SyntaxKind::ImportSpecifier));

        for specifier in specifiers {
            if let Some(name) = specifier.child_by_field(fields::NAME) {
                imports.push(Dependency::new(name.text(), module.as_str()));
            }
        }
    }

    imports
}

/// Prepend an import statement for every dependency the file lacks
///
/// Returns the new root and the dependencies actually added, in order. The
/// rest of the file renders byte-identical.
pub fn synthesize_imports(
    mut root: SyntaxNode,
    dependencies: &[Dependency],
) -> (SyntaxNode, Vec<Dependency>) {
    let present: FxHashSet<Dependency> = existing_imports(&root).into_iter().collect();
    let mut seen = FxHashSet::default();
    let added: Vec<Dependency> = dependencies
        .iter()
        .filter(|dependency| !present.contains(*dependency) && seen.insert(*dependency))
        .cloned()
        .collect();

    let mut next_id = max_id(&root) + 1;
    for dependency in added.iter().rev() {
        let statement = SyntaxNode::synthetic_leaf(
            NodeId(next_id),
            node_kinds::IMPORT_STATEMENT,
            dependency.import_statement(),
        );
        next_id += 1;
        root.prepend_child(statement, "\n");
    }

    (root, added)
}

fn max_id(root: &SyntaxNode) -> u32 {
    let mut max = root.id.0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        max = max.max(node.id.0);
        stack.extend(node.children.iter());
    }
    max
}
