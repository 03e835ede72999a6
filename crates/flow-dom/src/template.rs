//! Declarative templates
//!
//! A `Template` is a custom element whose connected callback stamps a fixed
//! node list into its host, optionally inside a fresh shadow root.

use crate::{CustomElement, Document, NodeId, ShadowRootMode};

/// One node of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn element(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }

    /// Builder: add an attribute (no-op on text nodes)
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Builder: add a child (no-op on text nodes)
    pub fn child(mut self, node: TemplateNode) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    fn build(&self, document: &mut Document) -> NodeId {
        match self {
            Self::Text(content) => document.create_text(content),
            Self::Element { tag, attrs, children } => {
                let id = document.create_element(tag);
                for (name, value) in attrs {
                    document.set_attribute(id, name, value);
                }
                for child in children {
                    let child_id = child.build(document);
                    document.tree_mut().append_child(id, child_id);
                }
                id
            }
        }
    }
}

/// Template-backed custom element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    /// Render into a shadow root instead of the host's light tree
    pub shadow: bool,
    pub nodes: Vec<TemplateNode>,
}

impl Template {
    pub fn new(nodes: Vec<TemplateNode>) -> Self {
        Self { shadow: false, nodes }
    }

    pub fn shadowed(nodes: Vec<TemplateNode>) -> Self {
        Self { shadow: true, nodes }
    }
}

impl CustomElement for Template {
    fn connected(&self, document: &mut Document, host: NodeId) {
        let target = if self.shadow {
            document.attach_shadow(host, ShadowRootMode::Open)
        } else {
            host
        };

        // Each top-level node is built detached and inserted whole, so
        // observers see one record per stamped root.
        for node in &self.nodes {
            let id = node.build(document);
            document.append_child(target, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MutationObserverInit, MutationSource};
    use std::rc::Rc;

    #[test]
    fn test_light_template() {
        let mut doc = Document::default();
        doc.define("flowjs-nav", Rc::new(Template::new(vec![
            TemplateNode::element("a").attr("href", "/about").child(TemplateNode::text("About")),
        ]))).unwrap();

        let body = doc.body();
        let observer = doc.observe(body, MutationObserverInit::subtree_child_list());
        let nav = doc.create_element("flowjs-nav");
        doc.append_child(body, nav);

        let children = doc.children(nav);
        assert_eq!(children.len(), 1);
        assert_eq!(doc.get_attribute(children[0], "href"), Some("/about"));
        // host insertion + stamped anchor
        assert_eq!(doc.take_records(observer).len(), 2);
    }

    #[test]
    fn test_shadow_template() {
        let mut doc = Document::default();
        doc.define("flowjs-shell", Rc::new(Template::shadowed(vec![
            TemplateNode::element("div").attr("id", "app"),
        ]))).unwrap();

        let body = doc.body();
        let shell = doc.create_element("flowjs-shell");
        doc.append_child(body, shell);

        assert!(doc.children(shell).is_empty());
        let shadow = doc.shadow_root(shell).unwrap();
        assert!(doc.get_element_by_id(shadow, "app").is_some());
    }
}
