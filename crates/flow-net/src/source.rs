//! Component source trait

use std::rc::Rc;

use flow_dom::CustomElement;

use crate::NetError;

/// Network primitives the component loader suspends on.
///
/// Futures are polled on a single cooperative scheduler, so implementations
/// are free to hold `Rc`/`RefCell` state and need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ComponentSource {
    /// Check whether `url` points at an existing resource
    async fn exists(&self, url: &str) -> Result<bool, NetError>;

    /// Retrieve and parse the component module at `url`
    async fn retrieve(&self, url: &str) -> Result<Rc<dyn CustomElement>, NetError>;
}
