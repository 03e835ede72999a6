//! In-memory component source
//!
//! Serves modules registered up front and counts every request, with an
//! optional number of cooperative yields before each answer to stand in for
//! network latency.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use flow_dom::CustomElement;

use crate::{ComponentModule, ComponentSource, NetError};

enum Entry {
    Element(Rc<dyn CustomElement>),
    Raw(Vec<u8>),
}

/// Component source backed by a URL table
#[derive(Default)]
pub struct MemorySource {
    entries: RefCell<HashMap<String, Entry>>,
    exists_calls: RefCell<HashMap<String, usize>>,
    retrieve_calls: RefCell<HashMap<String, usize>>,
    latency: Cell<usize>,
    url_latency: RefCell<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield `yields` times before answering each request
    pub fn with_latency(self, yields: usize) -> Self {
        self.latency.set(yields);
        self
    }

    /// Yield `yields` times before answering requests for `url`, overriding
    /// the source-wide latency
    pub fn set_latency(&self, url: &str, yields: usize) {
        self.url_latency.borrow_mut().insert(url.to_string(), yields);
    }

    /// Serve a ready-made custom element at `url`
    pub fn insert(&self, url: &str, element: Rc<dyn CustomElement>) {
        self.entries.borrow_mut().insert(url.to_string(), Entry::Element(element));
    }

    /// Serve raw module bytes at `url`; they are parsed on retrieval
    pub fn insert_module(&self, url: &str, bytes: impl Into<Vec<u8>>) {
        self.entries.borrow_mut().insert(url.to_string(), Entry::Raw(bytes.into()));
    }

    pub fn remove(&self, url: &str) {
        self.entries.borrow_mut().remove(url);
    }

    /// Number of existence checks made for `url`
    pub fn exists_calls(&self, url: &str) -> usize {
        self.exists_calls.borrow().get(url).copied().unwrap_or(0)
    }

    /// Number of retrievals made for `url`
    pub fn retrieve_calls(&self, url: &str) -> usize {
        self.retrieve_calls.borrow().get(url).copied().unwrap_or(0)
    }

    async fn simulate_latency(&self, url: &str) {
        let yields = self.url_latency.borrow().get(url).copied().unwrap_or(self.latency.get());
        for _ in 0..yields {
            smol::future::yield_now().await;
        }
    }
}

fn bump(counter: &RefCell<HashMap<String, usize>>, url: &str) {
    *counter.borrow_mut().entry(url.to_string()).or_insert(0) += 1;
}

impl ComponentSource for MemorySource {
    async fn exists(&self, url: &str) -> Result<bool, NetError> {
        bump(&self.exists_calls, url);
        self.simulate_latency(url).await;
        Ok(self.entries.borrow().contains_key(url))
    }

    async fn retrieve(&self, url: &str) -> Result<Rc<dyn CustomElement>, NetError> {
        bump(&self.retrieve_calls, url);
        self.simulate_latency(url).await;

        let entries = self.entries.borrow();
        match entries.get(url) {
            Some(Entry::Element(element)) => Ok(element.clone()),
            Some(Entry::Raw(bytes)) => ComponentModule::parse(bytes)?.into_element(),
            None => Err(NetError::HttpError { status: 404 }),
        }
    }
}
