//! Route table and matcher
//!
//! Route keys are path patterns. A `:name` segment captures one or more word
//! or hyphen characters; the rest of the pattern is used as a regular
//! expression, anchored at both ends. Patterns are tried in declaration order
//! and the first match wins.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::RouterError;

/// What a route mounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Component name without the framework prefix
    pub component: String,
    /// Module path relative to the base URL
    pub file: String,
}

impl RouteDefinition {
    pub fn new(component: &str, file: &str) -> Self {
        Self {
            component: component.to_string(),
            file: file.to_string(),
        }
    }
}

/// Ordered mapping from path pattern to route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: IndexMap<String, RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a route
    pub fn route(mut self, pattern: &str, component: &str, file: &str) -> Self {
        self.insert(pattern, RouteDefinition::new(component, file));
        self
    }

    pub fn insert(&mut self, pattern: &str, definition: RouteDefinition) {
        self.routes.insert(pattern.to_string(), definition);
    }

    pub fn get(&self, pattern: &str) -> Option<&RouteDefinition> {
        self.routes.get(pattern)
    }

    /// Routes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteDefinition)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Definitions only, in declaration order
    pub fn definitions(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Result of matching a pathname
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// The route key that matched
    pub matched_path: String,
    /// Captured parameters in declaration order
    pub params: IndexMap<String, String>,
}

const PARAM_SEGMENT: &str = r":[^\s/]+";
const PARAM_CAPTURE: &str = "([A-Za-z0-9_-]+)";

/// A compiled route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a route key
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let malformed = |e: regex::Error| RouterError::MalformedRoutePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        };
        let (source, param_names) = translate(pattern).map_err(malformed)?;
        let regex = Regex::new(&format!("^{source}$")).map_err(malformed)?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match `pathname`, binding captures to parameter names by position
    pub fn captures(&self, pathname: &str) -> Option<RouteMatch> {
        let caps = self.regex.captures(pathname)?;
        let params = self.param_names.iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, value)| Some((name.clone(), value?.as_str().to_string())))
            .collect();

        Some(RouteMatch {
            matched_path: self.pattern.clone(),
            params,
        })
    }
}

/// Replace every `:name` run (up to whitespace or `/`) with a capture group
fn translate(pattern: &str) -> Result<(String, Vec<String>), regex::Error> {
    let param = Regex::new(PARAM_SEGMENT)?;
    let mut names = Vec::new();
    let source = param
        .replace_all(pattern, |caps: &Captures<'_>| {
            names.push(caps[0][1..].to_string());
            PARAM_CAPTURE
        })
        .into_owned();
    Ok((source, names))
}

/// Route patterns compiled once per table
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    patterns: Vec<RoutePattern>,
}

impl RouteMatcher {
    /// Compile every route of `table`; malformed patterns are logged and left out
    pub fn new(table: &RouteTable) -> Self {
        let patterns = table.iter()
            .filter_map(|(pattern, _)| match RoutePattern::compile(pattern) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::warn!("Skipping route: {}", e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// First route matching `pathname`, in declaration order
    pub fn find(&self, pathname: &str) -> Option<RouteMatch> {
        tracing::debug!("Parsing route for pathname: {}", pathname);
        let found = self.patterns.iter().find_map(|p| p.captures(pathname));
        match &found {
            Some(m) => tracing::debug!("Match found: {} {:?}", m.matched_path, m.params),
            None => tracing::debug!("No match found for pathname: {}", pathname),
        }
        found
    }

    /// Number of usable patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Match `pathname` against `table`
pub fn match_route(table: &RouteTable, pathname: &str) -> Option<RouteMatch> {
    RouteMatcher::new(table).find(pathname)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_table() -> RouteTable {
        RouteTable::new().route("/users/:id", "user-view", "user.js")
    }

    #[test]
    fn test_param_capture() {
        let m = match_route(&users_table(), "/users/42").unwrap();
        assert_eq!(m.matched_path, "/users/:id");
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_route(&users_table(), "/unknown"), None);
        assert_eq!(match_route(&users_table(), "/users/"), None);
        assert_eq!(match_route(&users_table(), "/users/42/extra"), None);
        assert_eq!(match_route(&RouteTable::new(), "/"), None);
    }

    #[test]
    fn test_first_declared_match_wins() {
        let table = RouteTable::new()
            .route("/posts/:slug", "post", "post.js")
            .route("/posts/new", "post-editor", "editor.js");
        let m = match_route(&table, "/posts/new").unwrap();
        assert_eq!(m.matched_path, "/posts/:slug");
        assert_eq!(m.params["slug"], "new");

        let reversed = RouteTable::new()
            .route("/posts/new", "post-editor", "editor.js")
            .route("/posts/:slug", "post", "post.js");
        assert_eq!(match_route(&reversed, "/posts/new").unwrap().matched_path, "/posts/new");
    }

    #[test]
    fn test_params_bound_in_declaration_order() {
        let table = RouteTable::new().route("/orgs/:org/repos/:repo", "repo", "repo.js");
        let m = match_route(&table, "/orgs/rust-lang/repos/regex_1").unwrap();
        let params: Vec<(&str, &str)> = m.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(params, vec![("org", "rust-lang"), ("repo", "regex_1")]);
    }

    #[test]
    fn test_param_characters() {
        let table = users_table();
        assert!(match_route(&table, "/users/jane-doe_2").is_some());
        assert!(match_route(&table, "/users/jane.doe").is_none());
        assert!(match_route(&table, "/users/a%20b").is_none());
    }

    #[test]
    fn test_malformed_pattern_is_skipped() {
        let table = RouteTable::new()
            .route("/broken/(:id", "broken", "broken.js")
            .route("/users/:id", "user-view", "user.js");

        assert!(matches!(
            RoutePattern::compile("/broken/(:id"),
            Err(RouterError::MalformedRoutePattern { .. })
        ));
        assert_eq!(RouteMatcher::new(&table).len(), 1);
        assert_eq!(match_route(&table, "/users/7").unwrap().params["id"], "7");
    }

    #[test]
    fn test_translate() {
        let (source, names) = translate("/a/:x/b/:y").unwrap();
        assert_eq!(source, format!("/a/{PARAM_CAPTURE}/b/{PARAM_CAPTURE}"));
        assert_eq!(names, vec!["x", "y"]);

        // A bare colon is literal
        let (source, names) = translate("/time/:/now").unwrap();
        assert_eq!(source, "/time/:/now");
        assert!(names.is_empty());

        // A name runs to the next `/` and may hold any other character
        let (source, names) = translate("/f/:file.json").unwrap();
        assert_eq!(source, format!("/f/{PARAM_CAPTURE}"));
        assert_eq!(names, vec!["file.json"]);
    }

    #[test]
    fn test_table_deserializes_in_order() {
        let json = r#"{
            "/": { "component": "home", "file": "components/home/home.js" },
            "/about": { "component": "about", "file": "components/about/about.js" },
            "/users/:id": { "component": "user", "file": "components/user/user.js" }
        }"#;
        let table: RouteTable = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/", "/about", "/users/:id"]);
    }
}
