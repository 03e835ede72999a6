//! Router Configuration
//!
//! Keys mirror the host page's configuration object, so the same JSON works
//! for both:
//!
//! ```json
//! {
//!   "baseUrl": "/",
//!   "componentFetchUrl": "/components/",
//!   "essentialComponents": ["flowjs-darkmodeswitch"],
//!   "routes": {
//!     "/": { "component": "home", "file": "components/home/home.js" },
//!     "/users/:id": { "component": "user", "file": "components/user/user.js" }
//!   }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::routes::{RouteDefinition, RouteTable};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Router configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowConfig {
    /// Prefix stripped from and prepended to every path
    pub base_url: String,

    /// Base for conventional `<tag>/<tag>.js` component lookup
    pub component_fetch_url: String,

    /// Components preloaded before the first route resolution, in order
    pub essential_components: Vec<String>,

    /// Path pattern to route, in precedence order
    pub routes: RouteTable,

    /// Scheme and host used to resolve link targets
    pub origin: String,

    /// Id of the element routed components are mounted into
    pub mount_id: String,

    /// Tag prefix of framework-managed elements
    pub component_prefix: String,

    /// Component mounted when nothing matches
    pub not_found: RouteDefinition,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            component_fetch_url: "/components/".to_string(),
            essential_components: Vec::new(),
            routes: RouteTable::new(),
            origin: "http://localhost".to_string(),
            mount_id: "app".to_string(),
            component_prefix: "flowjs-".to_string(),
            not_found: RouteDefinition::new("not-found", "components/not-found/not-found.js"),
        }
    }
}

impl FlowConfig {
    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builder: replace the route table
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Builder: set the base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self.normalized()
    }

    /// Builder: set the essential components
    pub fn with_essentials(mut self, tags: &[&str]) -> Self {
        self.essential_components = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Make `base_url` start and end with `/`
    pub fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim_matches('/');
        self.base_url = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    /// Whether `tag` names a framework-managed element
    pub fn is_managed(&self, tag: &str) -> bool {
        tag.starts_with(&self.component_prefix)
    }

    /// Tag of a routed component
    pub fn component_tag(&self, route: &RouteDefinition) -> String {
        format!("{}{}", self.component_prefix, route.component)
    }

    pub fn not_found_tag(&self) -> String {
        self.component_tag(&self.not_found)
    }

    /// Source URL of a routed component file
    pub fn routed_url(&self, file: &str) -> String {
        format!("{}{}", self.base_url, file)
    }

    /// Conventional source URL of a non-routed component
    pub fn component_url(&self, tag: &str) -> String {
        format!("{}{tag}/{tag}.js", self.component_fetch_url)
    }

    /// Route whose component renders as `tag`, the not-found route included
    pub fn route_for_tag(&self, tag: &str) -> Option<&RouteDefinition> {
        self.routes.definitions()
            .chain(std::iter::once(&self.not_found))
            .find(|r| self.component_tag(r) == tag)
    }

    /// Where the implementation of `tag` is fetched from
    pub fn source_url(&self, tag: &str) -> String {
        match self.route_for_tag(tag) {
            Some(route) => self.routed_url(&route.file),
            None => self.component_url(tag),
        }
    }
}
