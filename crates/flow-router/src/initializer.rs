//! Tree initializer
//!
//! Walks a subtree for framework elements that have not been initialized yet,
//! loads their implementation and descends into what they rendered, including
//! their shadow roots. Each walked root is then observed so elements inserted
//! later go through the same procedure when mutations are flushed.
//!
//! An element is marked with `initialized` before its load starts. Anything
//! that runs while the load is suspended (another walk, a mutation flush)
//! sees the mark and leaves the element alone.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use flow_dom::{Document, MutationObserverInit, MutationSource, NodeId, ObserverId, walker};
use flow_net::ComponentSource;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::links;
use crate::loader::ComponentLoader;
use crate::FlowConfig;

/// Marks elements whose load-and-descend sequence has run
pub const INITIALIZED_ATTR: &str = "initialized";

/// Discovers and loads framework elements in a document
pub struct TreeInitializer<S> {
    document: Rc<RefCell<Document>>,
    config: Rc<FlowConfig>,
    loader: Rc<ComponentLoader<S>>,
    observers: RefCell<Vec<(NodeId, ObserverId)>>,
}

impl<S: ComponentSource + 'static> TreeInitializer<S> {
    pub fn new(
        document: Rc<RefCell<Document>>,
        config: Rc<FlowConfig>,
        loader: Rc<ComponentLoader<S>>,
    ) -> Self {
        Self {
            document,
            config,
            loader,
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Initialize every unmarked framework element under `root`, then keep
    /// watching `root` for insertions.
    ///
    /// Returns the number of elements newly initialized, nested ones included.
    pub fn initialize(&self, root: NodeId) -> LocalBoxFuture<'_, usize> {
        async move {
            tracing::debug!("Initializing components for root {:?}", root);
            let count = self.walk(root).await;
            self.watch(root);
            count
        }
        .boxed_local()
    }

    /// Number of roots currently observed
    pub fn watched_roots(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Deliver queued mutation records: every added element, and the unmarked
    /// elements below it, is initialized. Repeats until no records are left.
    ///
    /// Returns the number of elements newly initialized.
    pub async fn flush_mutations(&self) -> usize {
        let mut count = 0;
        loop {
            let added = self.take_added_nodes();
            if added.is_empty() {
                return count;
            }
            for node in added {
                count += self.initialize_added(node).await;
            }
        }
    }

    async fn walk(&self, root: NodeId) -> usize {
        let pending: Vec<NodeId> = {
            let doc = self.document.borrow();
            walker::descendants(doc.tree(), root)
                .into_iter()
                .filter(|&n| !doc.has_attribute(n, INITIALIZED_ATTR))
                .collect()
        };

        let mut count = 0;
        for element in pending {
            count += self.initialize_element(element).await;
        }

        links::attach_link_listeners(&mut self.document.borrow_mut(), root);
        count
    }

    /// Mark, load and descend into one element
    async fn initialize_element(&self, element: NodeId) -> usize {
        let tag = {
            let mut doc = self.document.borrow_mut();
            let Some(tag) = doc.tag(element).map(str::to_string) else {
                return 0;
            };
            if !self.config.is_managed(&tag) || doc.has_attribute(element, INITIALIZED_ATTR) {
                return 0;
            }
            doc.set_attribute(element, INITIALIZED_ATTR, "true");
            tag
        };

        let url = self.config.source_url(&tag);
        if let Err(e) = self.loader.ensure_loaded(&tag, &url).await {
            tracing::warn!("Component {} will not render: {}", tag, e);
        }

        let subtree = {
            let doc = self.document.borrow();
            doc.shadow_root(element).unwrap_or(element)
        };
        1 + self.initialize(subtree).await
    }

    async fn initialize_added(&self, node: NodeId) -> usize {
        let live = {
            let doc = self.document.borrow();
            doc.tree().is_connected(node) && doc.tree().get(node).is_some_and(|n| n.is_element())
        };
        if !live {
            return 0;
        }

        let count = self.initialize_element(node).await;
        let nested = self.walk(node).await;
        count + nested
    }

    fn watch(&self, root: NodeId) {
        let mut observers = self.observers.borrow_mut();
        let mut doc = self.document.borrow_mut();
        prune_detached(&mut observers, &mut doc);

        if observers.iter().any(|&(watched, _)| watched == root) {
            return;
        }
        let id = doc.observe(root, MutationObserverInit::subtree_child_list());
        observers.push((root, id));
    }

    fn take_added_nodes(&self) -> Vec<NodeId> {
        let mut observers = self.observers.borrow_mut();
        let mut doc = self.document.borrow_mut();
        let mut seen = HashSet::new();

        let added = observers.iter()
            .flat_map(|&(_, id)| doc.take_records(id))
            .flat_map(|record| record.added_nodes)
            .filter(|&node| seen.insert(node))
            .collect();
        prune_detached(&mut observers, &mut doc);
        added
    }
}

/// Disconnect observers whose root has left the document
fn prune_detached(observers: &mut Vec<(NodeId, ObserverId)>, doc: &mut Document) {
    observers.retain(|&(root, id)| {
        let connected = doc.tree().is_connected(root);
        if !connected {
            doc.disconnect(id);
        }
        connected
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_dom::{Template, TemplateNode};
    use flow_net::MemorySource;
    use crate::LoadStatus;

    struct Fixture {
        document: Rc<RefCell<Document>>,
        loader: Rc<ComponentLoader<MemorySource>>,
        initializer: TreeInitializer<MemorySource>,
    }

    fn fixture(source: MemorySource) -> Fixture {
        let document = Rc::new(RefCell::new(Document::default()));
        let config = Rc::new(FlowConfig::default());
        let loader = Rc::new(ComponentLoader::new(document.clone(), Rc::new(source)));
        let initializer = TreeInitializer::new(document.clone(), config, loader.clone());
        Fixture { document, loader, initializer }
    }

    fn url(tag: &str) -> String {
        FlowConfig::default().component_url(tag)
    }

    fn append(document: &Rc<RefCell<Document>>, parent: NodeId, tag: &str) -> NodeId {
        let mut doc = document.borrow_mut();
        let id = doc.create_element(tag);
        doc.append_child(parent, id);
        id
    }

    #[test]
    fn test_marks_only_framework_elements() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-nav"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        let nav = append(&f.document, body, "flowjs-nav");
        let div = append(&f.document, body, "div");

        let count = smol::block_on(f.initializer.initialize(body));
        assert_eq!(count, 1);

        let doc = f.document.borrow();
        assert_eq!(doc.get_attribute(nav, INITIALIZED_ATTR), Some("true"));
        assert!(!doc.has_attribute(div, INITIALIZED_ATTR));
        assert!(doc.custom_elements().is_defined("flowjs-nav"));
    }

    #[test]
    fn test_reinitialize_is_idempotent() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-nav"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        append(&f.document, body, "flowjs-nav");

        assert_eq!(smol::block_on(f.initializer.initialize(body)), 1);
        let watched = f.initializer.watched_roots();
        assert_eq!(smol::block_on(f.initializer.initialize(body)), 0);
        assert_eq!(f.initializer.watched_roots(), watched);
        assert_eq!(f.loader.source().exists_calls(&url("flowjs-nav")), 1);
    }

    #[test]
    fn test_descends_into_shadow_roots() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-shell"), Rc::new(Template::shadowed(vec![
            TemplateNode::element("flowjs-header"),
        ])));
        source.insert(&url("flowjs-header"), Rc::new(Template::shadowed(vec![
            TemplateNode::element("a").attr("href", "/about"),
        ])));
        let f = fixture(source);
        let body = f.document.borrow().body();
        let shell = append(&f.document, body, "flowjs-shell");

        let count = smol::block_on(f.initializer.initialize(body));
        assert_eq!(count, 2);

        let doc = f.document.borrow();
        let shadow = doc.shadow_root(shell).unwrap();
        let header = doc.children(shadow)[0];
        assert!(doc.has_attribute(header, INITIALIZED_ATTR));
        let header_shadow = doc.shadow_root(header).unwrap();
        let anchor = doc.children(header_shadow)[0];
        assert!(links::is_intercepted(&doc, anchor));
    }

    #[test]
    fn test_failed_load_leaves_siblings_alone() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-ok"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        let missing = append(&f.document, body, "flowjs-missing");
        let ok = append(&f.document, body, "flowjs-ok");

        assert_eq!(smol::block_on(f.initializer.initialize(body)), 2);
        let doc = f.document.borrow();
        assert!(doc.has_attribute(missing, INITIALIZED_ATTR));
        assert!(!doc.custom_elements().is_defined("flowjs-missing"));
        assert!(doc.custom_elements().is_defined("flowjs-ok"));
        assert!(doc.tree().element(ok).unwrap().upgraded);
    }

    #[test]
    fn test_added_element_is_loaded_once() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-toast"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        smol::block_on(f.initializer.initialize(body));

        let wrapper = append(&f.document, body, "section");
        let toast = append(&f.document, wrapper, "flowjs-toast");

        assert_eq!(smol::block_on(f.initializer.flush_mutations()), 1);
        assert_eq!(smol::block_on(f.initializer.flush_mutations()), 0);
        assert!(f.document.borrow().has_attribute(toast, INITIALIZED_ATTR));
        assert_eq!(f.loader.source().exists_calls(&url("flowjs-toast")), 1);
    }

    #[test]
    fn test_detached_additions_are_skipped() {
        let f = fixture(MemorySource::new());
        let body = f.document.borrow().body();
        smol::block_on(f.initializer.initialize(body));

        let ghost = append(&f.document, body, "flowjs-ghost");
        f.document.borrow_mut().clear_children(body);

        assert_eq!(smol::block_on(f.initializer.flush_mutations()), 0);
        assert!(!f.document.borrow().has_attribute(ghost, INITIALIZED_ATTR));
    }

    #[test]
    fn test_detached_roots_stop_being_watched() {
        let source = MemorySource::new();
        source.insert(&url("flowjs-card"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        smol::block_on(f.initializer.initialize(body));
        assert_eq!(f.initializer.watched_roots(), 1);

        for _ in 0..10 {
            let card = append(&f.document, body, "flowjs-card");
            smol::block_on(f.initializer.flush_mutations());
            assert!(f.document.borrow().has_attribute(card, INITIALIZED_ATTR));
            f.document.borrow_mut().clear_children(body);
        }
        smol::block_on(f.initializer.flush_mutations());

        assert_eq!(f.initializer.watched_roots(), 1);
        assert!(!f.document.borrow().has_pending_mutations());
    }

    #[test]
    fn test_flush_during_load_does_not_reload() {
        let source = MemorySource::new().with_latency(3);
        source.insert(&url("flowjs-slow"), Rc::new(Template::default()));
        let f = fixture(source);
        let body = f.document.borrow().body();
        smol::block_on(f.initializer.initialize(body));
        let slow = append(&f.document, body, "flowjs-slow");

        let (initialized, flushed) = smol::block_on(async {
            futures::join!(f.initializer.initialize(body), async {
                // The walk above is suspended inside the load by now
                {
                    let mut doc = f.document.borrow_mut();
                    let section = doc.create_element("section");
                    doc.append_child(body, section);
                    doc.append_child(section, slow);
                }
                assert!(f.document.borrow().has_attribute(slow, INITIALIZED_ATTR));
                assert_eq!(f.loader.status("flowjs-slow"), LoadStatus::InProgress);
                f.initializer.flush_mutations().await
            })
        });

        assert_eq!(initialized, 1);
        assert_eq!(flushed, 0);
        assert_eq!(f.loader.source().exists_calls(&url("flowjs-slow")), 1);
        assert!(f.document.borrow().tree().element(slow).unwrap().upgraded);
    }
}
