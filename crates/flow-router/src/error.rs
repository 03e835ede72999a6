//! Router errors
//!
//! Every variant is `Clone`: a single in-flight component load hands the same
//! outcome to all of its waiters.

/// Router error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("component file not found: {url} ({tag})")]
    LoadNotFound { tag: String, url: String },

    #[error("failed to load component {tag} from {url}: {reason}")]
    LoadFailure { tag: String, url: String, reason: String },

    #[error("no route matches {pathname}")]
    RouteMismatch { pathname: String },

    #[error("mount point #{id} not found in the document or any shadow root")]
    MountPointMissing { id: String },

    #[error("invalid route pattern {pattern}: {reason}")]
    MalformedRoutePattern { pattern: String, reason: String },
}

impl RouterError {
    /// Whether the error came from loading a component
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::LoadNotFound { .. } | Self::LoadFailure { .. })
    }
}
