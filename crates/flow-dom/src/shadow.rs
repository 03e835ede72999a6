//! Shadow DOM
//!
//! A shadow root is an isolated subtree attached to a host element. It is not
//! one of the host's children: light-tree traversal stops at the boundary and
//! only `DomTree::shadow_root` crosses it.

use crate::NodeId;

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Data stored on a shadow root node
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    pub host: NodeId,
    pub mode: ShadowRootMode,
}

impl ShadowRootData {
    pub fn new(host: NodeId, mode: ShadowRootMode) -> Self {
        Self { host, mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomTree;

    #[test]
    fn test_shadow_root_is_not_a_child() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let host = tree.create_element("flowjs-shell");
        tree.append_child(root, host);

        let shadow = tree.attach_shadow(host, ShadowRootMode::Open);
        let inner = tree.create_element("div");
        tree.append_child(shadow, inner);

        assert_eq!(tree.shadow_root(host), Some(shadow));
        assert_eq!(tree.host(shadow), Some(host));
        assert!(tree.child_ids(host).is_empty());
        assert!(tree.is_connected(inner));
    }

    #[test]
    fn test_attach_shadow_twice_returns_same_root() {
        let mut tree = DomTree::new();
        let host = tree.create_element("flowjs-card");
        let first = tree.attach_shadow(host, ShadowRootMode::Open);
        let second = tree.attach_shadow(host, ShadowRootMode::Closed);
        assert_eq!(first, second);
    }
}
