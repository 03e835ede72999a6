//! Mutation Observer
//!
//! Child-list mutation records queued per observer. Delivery is pull-based:
//! the owner of an `ObserverId` drains its queue with `take_records`.

use crate::{DomTree, NodeId};

/// Handle to a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Mutation observer options
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Child insertions anywhere below the target
    pub fn subtree_child_list() -> Self {
        Self { child_list: true, subtree: true }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

/// Producer of subtree change batches
pub trait MutationSource {
    /// Start observing `target`
    fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId;

    /// Drain the records queued for `observer`
    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord>;

    /// Stop delivery and drop queued records
    fn disconnect(&mut self, observer: ObserverId);
}

#[derive(Debug)]
struct Registration {
    id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
    pending: Vec<MutationRecord>,
}

impl Registration {
    fn matches(&self, tree: &DomTree, record: &MutationRecord) -> bool {
        if !self.options.child_list {
            return false;
        }
        if record.target == self.target {
            return true;
        }
        self.options.subtree && tree.is_inclusive_ancestor(self.target, record.target)
    }
}

/// Registered observers of one document
#[derive(Debug, Default)]
pub(crate) struct MutationObservers {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl MutationObservers {
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.registrations.push(Registration {
            id,
            target,
            options,
            pending: Vec::new(),
        });
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        self.registrations.retain(|r| r.id != id);
    }

    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.registrations.iter_mut()
            .find(|r| r.id == id)
            .map(|r| std::mem::take(&mut r.pending))
            .unwrap_or_default()
    }

    pub fn has_pending(&self) -> bool {
        self.registrations.iter().any(|r| !r.pending.is_empty())
    }

    /// Queue `record` for every observer interested in it
    pub fn notify(&mut self, tree: &DomTree, record: MutationRecord) {
        for registration in &mut self.registrations {
            if registration.matches(tree, &record) {
                registration.pending.push(record.clone());
            }
        }
    }
}
