//! Flow DOM - Document Object Model
//!
//! Arena-based document tree used by the Flow router: elements, shadow roots,
//! the custom element registry and child-list mutation records.

mod node;
mod tree;
mod document;
mod shadow;
mod custom_elements;
mod observer;
mod template;
pub mod walker;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::DomTree;
pub use document::Document;
pub use shadow::ShadowRootMode;
pub use custom_elements::{CustomElement, CustomElementRegistry, CustomElementError};
pub use observer::{MutationObserverInit, MutationRecord, MutationSource, ObserverId};
pub use template::{Template, TemplateNode};
pub use walker::ComposedTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
