//! Node and parent lookup over an immutable parsed tree

use rustc_hash::FxHashMap;

use crate::features::parsing::domain::{NodeId, SyntaxNode};

/// Id → node and id → parent maps for one parsed tree
#[derive(Debug)]
pub struct TreeIndex<'t> {
    nodes: FxHashMap<NodeId, &'t SyntaxNode>,
    parents: FxHashMap<NodeId, NodeId>,
}

impl<'t> TreeIndex<'t> {
    pub fn build(root: &'t SyntaxNode) -> Self {
        let mut nodes = FxHashMap::default();
        let mut parents = FxHashMap::default();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            nodes.insert(node.id, node);
            for child in &node.children {
                parents.insert(child.id, node.id);
                stack.push(child);
            }
        }

        Self { nodes, parents }
    }

    pub fn get(&self, id: NodeId) -> Option<&'t SyntaxNode> {
        self.nodes.get(&id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<&'t SyntaxNode> {
        self.parents.get(&id).and_then(|parent| self.get(*parent))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
