//! Component module documents
//!
//! A module is a JSON document whose `default` export describes a template:
//!
//! ```json
//! { "default": { "shadow": true, "template": [
//!     { "tag": "nav", "children": [
//!         { "tag": "a", "attrs": { "href": "/about" }, "children": ["About"] }
//!     ] },
//!     { "tag": "div", "attrs": { "id": "app" } }
//! ] } }
//! ```

use std::rc::Rc;

use flow_dom::{CustomElement, Template, TemplateNode};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::NetError;

/// A parsed component module
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentModule {
    #[serde(default)]
    pub default: Option<ComponentExport>,
}

/// The default export of a module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentExport {
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub template: Vec<ModuleNode>,
}

/// Template node as written in a module
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: IndexMap<String, String>,
        #[serde(default)]
        children: Vec<ModuleNode>,
    },
}

impl ModuleNode {
    fn into_template_node(self) -> TemplateNode {
        match self {
            Self::Text(content) => TemplateNode::Text(content),
            Self::Element { tag, attrs, children } => TemplateNode::Element {
                tag,
                attrs: attrs.into_iter().collect(),
                children: children.into_iter().map(Self::into_template_node).collect(),
            },
        }
    }
}

impl ComponentModule {
    /// Parse a module document
    pub fn parse(bytes: &[u8]) -> Result<Self, NetError> {
        serde_json::from_slice(bytes).map_err(|e| NetError::Module(e.to_string()))
    }

    /// The default export as a registrable custom element
    pub fn into_element(self) -> Result<Rc<dyn CustomElement>, NetError> {
        let export = self.default
            .ok_or_else(|| NetError::Module("module has no default export".to_string()))?;
        Ok(Rc::new(export.into_template()))
    }
}

impl ComponentExport {
    pub fn into_template(self) -> Template {
        Template {
            shadow: self.shadow,
            nodes: self.template.into_iter().map(ModuleNode::into_template_node).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_module() {
        let json = br#"{ "default": { "shadow": true, "template": [
            { "tag": "a", "attrs": { "href": "/about", "class": "nav" }, "children": ["About"] }
        ] } }"#;

        let module = ComponentModule::parse(json).unwrap();
        let template = module.default.unwrap().into_template();
        assert!(template.shadow);
        assert_eq!(
            template.nodes,
            vec![TemplateNode::element("a")
                .attr("href", "/about")
                .attr("class", "nav")
                .child(TemplateNode::text("About"))]
        );
    }

    #[test]
    fn test_missing_default_export() {
        let module = ComponentModule::parse(br#"{ "named": {} }"#).unwrap();
        assert!(matches!(module.into_element(), Err(NetError::Module(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(ComponentModule::parse(b"export default class {}"), Err(NetError::Module(_))));
    }
}
