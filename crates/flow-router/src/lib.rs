//! Flow Router
//!
//! Client-side routing and lazy component loading for front ends built on
//! custom elements.
//!
//! # Pipeline
//! - [`RouteMatcher`] turns a pathname into a route and its parameters
//! - [`ComponentLoader`] fetches and registers each component once
//! - [`TreeInitializer`] finds framework elements, shadow roots included,
//!   and keeps watching for new ones
//! - [`Router`] drives navigations and mounts the routed component
//!
//! # Example
//! ```rust,ignore
//! use flow_router::{FlowConfig, Router};
//! use flow_net::HttpSource;
//!
//! let config = FlowConfig::from_file("flow.json")?;
//! let source = HttpSource::new(&config.origin)?;
//! let router = Router::new(document, config, source);
//! let outcome = smol::block_on(router.start());
//! ```

mod error;
mod config;
mod routes;
mod loader;
mod initializer;
mod navigation;
pub mod history;
pub mod links;
pub mod logging;

pub use error::RouterError;
pub use config::{ConfigError, FlowConfig};
pub use routes::{match_route, RouteDefinition, RouteMatch, RouteMatcher, RoutePattern, RouteTable};
pub use loader::{ComponentLoader, LoadResult, LoadStatus};
pub use initializer::{TreeInitializer, INITIALIZED_ATTR};
pub use navigation::{
    effective_pathname, LinkOutcome, NavigationOutcome, NavigationState, Router, PARAMS_ATTR,
};
pub use history::{History, HistoryEntry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
