//! Tree walking across shadow boundaries
//!
//! The walk is written against `ComposedTree`, which only knows how to list a
//! node's light children and how to step into an isolated subtree. A tree
//! without shadow roots simply answers `None` from `shadow_root`.

use crate::{DomTree, NodeId};

/// Minimal view of a tree that may contain isolated subtrees
pub trait ComposedTree {
    /// Light-tree children, in order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Root of the isolated subtree hosted by `node`
    fn shadow_root(&self, node: NodeId) -> Option<NodeId>;

    fn is_element(&self, node: NodeId) -> bool;
}

impl ComposedTree for DomTree {
    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_ids(node)
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        DomTree::shadow_root(self, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|n| n.is_element())
    }
}

/// Element descendants of `root` in preorder, without entering shadow roots.
///
/// `root` itself is not included.
pub fn descendants<T: ComposedTree + ?Sized>(tree: &T, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(root).into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if tree.is_element(node) {
            out.push(node);
        }
        stack.extend(tree.children(node).into_iter().rev());
    }
    out
}

/// Find the first node matching `pred`, searching the light tree of `root`
/// first and then, depth-first, the isolated subtree of every element in it.
pub fn find_composed<T, P>(tree: &T, root: NodeId, pred: &P) -> Option<NodeId>
where
    T: ComposedTree + ?Sized,
    P: Fn(NodeId) -> bool,
{
    let light = descendants(tree, root);
    if let Some(found) = light.iter().copied().find(|&n| pred(n)) {
        return Some(found);
    }

    light.into_iter()
        .filter_map(|n| tree.shadow_root(n))
        .find_map(|shadow| find_composed(tree, shadow, pred))
}

/// Every element reachable from `root`, entering each shadow root right after
/// its host.
pub fn composed_descendants<T: ComposedTree + ?Sized>(tree: &T, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for node in descendants(tree, root) {
        out.push(node);
        if let Some(shadow) = tree.shadow_root(node) {
            out.extend(composed_descendants(tree, shadow));
        }
    }
    out
}
