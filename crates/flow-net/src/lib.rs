//! Flow Networking
//!
//! Where component implementations come from: an existence check and a module
//! retrieval per source URL, over HTTP or from memory.

mod source;
mod module;
mod http;
mod memory;

pub use source::ComponentSource;
pub use module::{ComponentModule, ComponentExport, ModuleNode};
pub use http::HttpSource;
pub use memory::MemorySource;
pub use url::Url;

/// Network error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid component module: {0}")]
    Module(String),
}
