//! Navigation controller
//!
//! One navigation runs Resolving, Matching, Loading and Mounting in turn and
//! ends Idle. A pathname without a matching route, or a route whose component
//! fails to load, is rendered with the not-found component instead.
//!
//! Navigations are not serialized. Two overlapping runs each go through the
//! whole pipeline and the one that mounts last owns the mount point.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use flow_dom::{Document, NodeId, walker};
use flow_net::ComponentSource;
use indexmap::IndexMap;
use url::Url;

use crate::history::History;
use crate::initializer::TreeInitializer;
use crate::links;
use crate::loader::ComponentLoader;
use crate::routes::RouteMatcher;
use crate::{FlowConfig, RouterError};

/// Attribute carrying the matched route parameters as a JSON object
pub const PARAMS_ATTR: &str = "params";

/// Navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Resolving,
    Matching,
    Loading,
    Mounting,
    NotFound,
}

/// How a navigation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The routed component was mounted
    Mounted {
        tag: String,
        params: IndexMap<String, String>,
    },
    /// The not-found component was mounted instead
    NotFound { reason: RouterError },
    /// Nothing was mounted
    Aborted(RouterError),
}

/// Result of following a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The anchor has no router listener; default navigation applies
    NotIntercepted,
    /// The link points at the current path
    Unchanged,
    /// The href could not be resolved
    InvalidHref,
    Navigated(NavigationOutcome),
}

/// Client-side router
pub struct Router<S> {
    document: Rc<RefCell<Document>>,
    config: Rc<FlowConfig>,
    loader: Rc<ComponentLoader<S>>,
    initializer: TreeInitializer<S>,
    matcher: RouteMatcher,
    history: RefCell<History>,
    state: Cell<NavigationState>,
}

impl<S: ComponentSource + 'static> Router<S> {
    /// Create a router for `document`; the document URL gives the initial path
    pub fn new(document: Rc<RefCell<Document>>, config: FlowConfig, source: S) -> Self {
        let config = Rc::new(config.normalized());
        let loader = Rc::new(ComponentLoader::new(document.clone(), Rc::new(source)));
        let initializer = TreeInitializer::new(document.clone(), config.clone(), loader.clone());
        let matcher = RouteMatcher::new(&config.routes);
        let initial_path = initial_path(document.borrow().url());

        tracing::debug!("Router created at {} with {} routes", initial_path, matcher.len());

        Self {
            document,
            config,
            loader,
            initializer,
            matcher,
            history: RefCell::new(History::new(&initial_path)),
            state: Cell::new(NavigationState::Idle),
        }
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn loader(&self) -> &ComponentLoader<S> {
        &self.loader
    }

    pub fn initializer(&self) -> &TreeInitializer<S> {
        &self.initializer
    }

    pub fn history(&self) -> Ref<'_, History> {
        self.history.borrow()
    }

    /// Current state of the most recently advanced navigation
    pub fn state(&self) -> NavigationState {
        self.state.get()
    }

    /// Path of the current history entry
    pub fn current_path(&self) -> String {
        self.history.borrow().current().path.clone()
    }

    /// Document ready: render the route for the current path
    pub async fn start(&self) -> NavigationOutcome {
        tracing::info!("Starting router at {}", self.current_path());
        self.load_route().await
    }

    /// Run a full navigation for the current path
    pub async fn load_route(&self) -> NavigationOutcome {
        self.state.set(NavigationState::Resolving);
        self.loader.preload_essentials(&self.config).await;
        let body = self.document.borrow().body();
        self.initializer.initialize(body).await;

        let Some(mount_point) = self.find_mount_point() else {
            let error = RouterError::MountPointMissing { id: self.config.mount_id.clone() };
            tracing::error!("Navigation aborted: {}", error);
            self.state.set(NavigationState::Idle);
            return NavigationOutcome::Aborted(error);
        };

        self.state.set(NavigationState::Matching);
        let pathname = effective_pathname(&self.config.base_url, &self.current_path());
        let routed = self.matcher.find(&pathname).and_then(|m| {
            let route = self.config.routes.get(&m.matched_path)?;
            Some((route.clone(), m.params))
        });

        let outcome = match routed {
            Some((route, params)) => {
                self.state.set(NavigationState::Loading);
                let tag = self.config.component_tag(&route);
                let url = self.config.routed_url(&route.file);
                match self.loader.ensure_loaded(&tag, &url).await {
                    Ok(()) => {
                        self.mount(mount_point, &tag, Some(&params)).await;
                        NavigationOutcome::Mounted { tag, params }
                    }
                    Err(e) => {
                        tracing::error!("Route component {} failed to load: {}", tag, e);
                        self.mount_not_found(mount_point, e).await
                    }
                }
            }
            None => self.mount_not_found(mount_point, RouterError::RouteMismatch { pathname }).await,
        };

        self.flush_mutations().await;
        self.state.set(NavigationState::Idle);
        outcome
    }

    /// Push `href` and navigate to it, unless it resolves to the current path
    pub async fn navigate(&self, href: &str) -> LinkOutcome {
        self.follow(href, false).await
    }

    /// Navigate to `href` in place of the current history entry
    pub async fn replace(&self, href: &str) -> LinkOutcome {
        self.follow(href, true).await
    }

    async fn follow(&self, href: &str, replace: bool) -> LinkOutcome {
        let path = match links::resolve_link(&self.config, href) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Cannot resolve link {}: {}", href, e);
                return LinkOutcome::InvalidHref;
            }
        };
        if path == self.current_path() {
            return LinkOutcome::Unchanged;
        }

        {
            let mut history = self.history.borrow_mut();
            if replace {
                history.replace_state(&path);
            } else {
                history.push_state(&path);
            }
        }
        LinkOutcome::Navigated(self.load_route().await)
    }

    /// Click on `anchor`
    pub async fn click(&self, anchor: NodeId) -> LinkOutcome {
        let href = {
            let doc = self.document.borrow();
            if !links::is_intercepted(&doc, anchor) {
                return LinkOutcome::NotIntercepted;
            }
            doc.get_attribute(anchor, "href").map(str::to_string)
        };
        match href {
            Some(href) => self.navigate(&href).await,
            None => LinkOutcome::NotIntercepted,
        }
    }

    /// History back; `None` when there is no previous entry
    pub async fn back(&self) -> Option<NavigationOutcome> {
        let moved = self.history.borrow_mut().back().is_some();
        if !moved {
            return None;
        }
        Some(self.load_route().await)
    }

    /// History forward; `None` when there is no next entry
    pub async fn forward(&self) -> Option<NavigationOutcome> {
        let moved = self.history.borrow_mut().forward().is_some();
        if !moved {
            return None;
        }
        Some(self.load_route().await)
    }

    /// Deliver pending mutation records to the tree initializer
    pub async fn flush_mutations(&self) -> usize {
        self.initializer.flush_mutations().await
    }

    /// Locate the mount point in the document or any shadow root
    pub fn find_mount_point(&self) -> Option<NodeId> {
        let doc = self.document.borrow();
        let tree = doc.tree();
        let id = self.config.mount_id.as_str();
        walker::find_composed(tree, tree.root(), &|n| {
            tree.element(n).and_then(|e| e.id.as_deref()) == Some(id)
        })
    }

    async fn mount_not_found(&self, mount_point: NodeId, reason: RouterError) -> NavigationOutcome {
        self.state.set(NavigationState::NotFound);
        tracing::warn!("Rendering not-found page: {}", reason);

        let tag = self.config.not_found_tag();
        let url = self.config.routed_url(&self.config.not_found.file);
        if let Err(e) = self.loader.ensure_loaded(&tag, &url).await {
            tracing::error!("Not-found component {} unavailable: {}", tag, e);
        }

        self.mount(mount_point, &tag, None).await;
        NavigationOutcome::NotFound { reason }
    }

    /// Replace the mount point's content with a single `tag` element
    async fn mount(&self, mount_point: NodeId, tag: &str, params: Option<&IndexMap<String, String>>) {
        self.state.set(NavigationState::Mounting);
        {
            let mut doc = self.document.borrow_mut();
            doc.clear_children(mount_point);
            let element = doc.create_element(tag);
            if let Some(params) = params {
                let json = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
                doc.set_attribute(element, PARAMS_ATTR, &json);
            }
            doc.append_child(mount_point, element);
        }
        tracing::info!("Mounted {} into #{}", tag, self.config.mount_id);

        self.initializer.initialize(mount_point).await;
    }
}

/// Pathname relative to `base_url`, keeping its leading `/`
pub fn effective_pathname(base_url: &str, pathname: &str) -> String {
    let prefix = base_url.trim_end_matches('/');
    match pathname.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => pathname.to_string(),
    }
}

fn initial_path(document_url: &str) -> String {
    Url::parse(document_url)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| "/".to_string())
}
