//! Link interception
//!
//! Anchors with an `href` are marked once with `data-link-listener`. The router
//! only intercepts clicks on marked anchors; everything else is left to the
//! default navigation.

use flow_dom::{Document, NodeId, walker};
use url::Url;

use crate::FlowConfig;

/// Marks anchors whose clicks are routed
pub const LINK_LISTENER_ATTR: &str = "data-link-listener";

/// Mark every unmarked `<a href>` in the light tree under `root`.
///
/// Returns how many anchors were newly marked.
pub fn attach_link_listeners(document: &mut Document, root: NodeId) -> usize {
    let anchors: Vec<NodeId> = walker::descendants(document.tree(), root)
        .into_iter()
        .filter(|&n| {
            document.tag(n) == Some("a")
                && document.has_attribute(n, "href")
                && !document.has_attribute(n, LINK_LISTENER_ATTR)
        })
        .collect();

    for &anchor in &anchors {
        document.set_attribute(anchor, LINK_LISTENER_ATTR, "true");
    }
    if !anchors.is_empty() {
        tracing::debug!("Attached link listeners to {} anchors under {:?}", anchors.len(), root);
    }
    anchors.len()
}

/// Whether clicks on `anchor` are handled by the router
pub fn is_intercepted(document: &Document, anchor: NodeId) -> bool {
    document.has_attribute(anchor, LINK_LISTENER_ATTR) && document.has_attribute(anchor, "href")
}

/// Resolve `href` against `origin + baseUrl` and return the resulting pathname
pub fn resolve_link(config: &FlowConfig, href: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(&format!("{}{}", config.origin.trim_end_matches('/'), config.base_url))?;
    Ok(base.join(href)?.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_is_idempotent() {
        let mut doc = Document::default();
        let body = doc.body();
        let link = doc.create_element("a");
        doc.set_attribute(link, "href", "/about");
        let bare = doc.create_element("a");
        doc.append_child(body, link);
        doc.append_child(body, bare);

        assert_eq!(attach_link_listeners(&mut doc, body), 1);
        assert_eq!(attach_link_listeners(&mut doc, body), 0);
        assert!(is_intercepted(&doc, link));
        assert!(!is_intercepted(&doc, bare));
    }

    #[test]
    fn test_resolve_link() {
        let config = FlowConfig::default();
        assert_eq!(resolve_link(&config, "/users/42").unwrap(), "/users/42");
        assert_eq!(resolve_link(&config, "about").unwrap(), "/about");
        assert_eq!(resolve_link(&config, "/search?q=x#top").unwrap(), "/search");

        let nested = FlowConfig::default().with_base_url("/shop/");
        assert_eq!(resolve_link(&nested, "items/3").unwrap(), "/shop/items/3");
        assert_eq!(resolve_link(&nested, "/elsewhere").unwrap(), "/elsewhere");
    }
}
