//! DOM Tree (arena-based allocation)

use crate::{Node, NodeData, NodeId, ElementData};
use crate::shadow::{ShadowRootData, ShadowRootMode};

/// Arena-based DOM tree
///
/// Node 0 is always the document node. Detached nodes keep their slot; ids are
/// never reused while the tree is alive.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Attach a shadow root to `host`, or return the one already attached
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> NodeId {
        if let Some(existing) = self.shadow_root(host) {
            return existing;
        }
        let shadow = self.push(Node::shadow_root(ShadowRootData::new(host, mode)));
        if let Some(elem) = self.element_mut(host) {
            elem.shadow_root = Some(shadow);
        }
        shadow
    }

    /// Shadow root hosted by `host`
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host)?.shadow_root
    }

    /// Host element of a shadow root
    pub fn host(&self, shadow: NodeId) -> Option<NodeId> {
        match &self.get(shadow)?.data {
            NodeData::ShadowRoot(data) => Some(data.host),
            _ => None,
        }
    }

    /// Element data of `id`
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data of `id`
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Tag name of an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Parent of `id` within its own tree (NONE for roots and detached nodes)
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Unlink `child` from its parent
    pub fn detach(&mut self, child: NodeId) {
        let Some(node) = self.get(child) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate over the children of a node
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildIter { tree: self, next: first }
    }

    /// Collect child ids (snapshot, safe to mutate the tree afterwards)
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    /// Whether `id` is reachable from the document node, crossing shadow
    /// boundaries through their hosts
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == NodeId::ROOT {
                return true;
            }
            let Some(node) = self.get(current) else { return false };
            if node.parent.is_valid() {
                current = node.parent;
            } else if let NodeData::ShadowRoot(data) = &node.data {
                current = data.host;
            } else {
                return false;
            }
        }
    }

    /// Whether `ancestor` is `id` or one of its light-tree ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = id;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.parent(current);
        }
        false
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's children
pub struct ChildIter<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(root, c);

        assert_eq!(tree.child_ids(root), vec![a, b, c]);
        assert_eq!(tree.parent(b), root);
    }

    #[test]
    fn test_detach_middle_child() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        for id in [a, b, c] {
            tree.append_child(root, id);
        }

        tree.detach(b);
        assert_eq!(tree.child_ids(root), vec![a, c]);
        assert!(!tree.is_connected(b));
        assert!(tree.is_connected(c));
    }

    #[test]
    fn test_reparenting_moves_node() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let left = tree.create_element("div");
        let right = tree.create_element("div");
        let leaf = tree.create_element("span");
        tree.append_child(root, left);
        tree.append_child(root, right);
        tree.append_child(left, leaf);
        tree.append_child(right, leaf);

        assert!(tree.child_ids(left).is_empty());
        assert_eq!(tree.child_ids(right), vec![leaf]);
        assert!(tree.is_inclusive_ancestor(right, leaf));
        assert!(!tree.is_inclusive_ancestor(left, leaf));
    }
}
