//! Document - High-level document API
//!
//! Structural changes made through `Document` are reported to mutation
//! observers and upgrade custom elements; `tree_mut` bypasses both.

use std::rc::Rc;

use crate::custom_elements::{CustomElement, CustomElementError, CustomElementRegistry};
use crate::observer::{MutationObservers, MutationObserverInit, MutationRecord, MutationSource, ObserverId};
use crate::shadow::ShadowRootMode;
use crate::walker;
use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    custom_elements: CustomElementRegistry,
    observers: MutationObservers,
}

impl Document {
    /// Create a document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            custom_elements: CustomElementRegistry::new(),
            observers: MutationObservers::default(),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably, without mutation records or upgrades
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The custom element registry
    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.tree.tag(id)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id)?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.set_attr(name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.tree.element_mut(id)?.remove_attr(name)
    }

    /// Attach (or return) the shadow root of `host`
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> NodeId {
        self.tree.attach_shadow(host, mode)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.tree.shadow_root(host)
    }

    /// Light-tree children of `id`
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.child_ids(id)
    }

    /// Find an element by id in the light tree under `scope`
    /// (the document node, a shadow root, or any element).
    pub fn get_element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        walker::descendants(&self.tree, scope)
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// Append `child` to `parent`, queueing mutation records and upgrading any
    /// defined custom elements that became connected.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let old_parent = self.tree.parent(child);
        if old_parent.is_valid() {
            self.tree.detach(child);
            self.observers.notify(&self.tree, MutationRecord {
                target: old_parent,
                added_nodes: Vec::new(),
                removed_nodes: vec![child],
            });
        }

        self.tree.append_child(parent, child);
        self.observers.notify(&self.tree, MutationRecord {
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
        });

        self.upgrade_subtree(child);
    }

    /// Remove every child of `parent`
    pub fn clear_children(&mut self, parent: NodeId) {
        let removed = self.tree.child_ids(parent);
        if removed.is_empty() {
            return;
        }
        for &child in &removed {
            self.tree.detach(child);
        }
        self.observers.notify(&self.tree, MutationRecord {
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: removed,
        });
    }

    /// Register a custom element and upgrade every connected instance of it.
    /// A name that is already defined is left as it is.
    pub fn define(
        &mut self,
        name: &str,
        constructor: Rc<dyn CustomElement>,
    ) -> Result<(), CustomElementError> {
        if self.custom_elements.is_defined(name) {
            tracing::debug!("Custom element {} already defined", name);
            return Ok(());
        }
        self.custom_elements.define(name, constructor)?;

        let instances: Vec<NodeId> = walker::composed_descendants(&self.tree, self.tree.root())
            .into_iter()
            .filter(|&n| self.tree.tag(n) == Some(name))
            .collect();
        for node in instances {
            self.upgrade(node);
        }
        Ok(())
    }

    /// Run the connected callback of `node` if its tag is defined and it has
    /// not been upgraded yet
    pub fn upgrade(&mut self, node: NodeId) {
        if !self.tree.is_connected(node) {
            return;
        }
        let Some(elem) = self.tree.element(node) else { return };
        if elem.upgraded {
            return;
        }
        let Some(constructor) = self.custom_elements.get(&elem.tag) else { return };

        if let Some(elem) = self.tree.element_mut(node) {
            elem.upgraded = true;
        }
        constructor.connected(self, node);
    }

    fn upgrade_subtree(&mut self, node: NodeId) {
        if !self.tree.is_connected(node) {
            return;
        }
        let mut candidates = vec![node];
        candidates.extend(walker::composed_descendants(&self.tree, node));
        for candidate in candidates {
            self.upgrade(candidate);
        }
    }

    /// Whether any observer has undelivered records
    pub fn has_pending_mutations(&self) -> bool {
        self.observers.has_pending()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl MutationSource for Document {
    fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.observers.observe(target, options)
    }

    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.observers.disconnect(observer);
    }
}
