//! Component loader
//!
//! Fetches component implementations and registers them with the document's
//! custom element registry, at most once per tag.
//!
//! Per tag the loader is in one of three states: not started (no entry),
//! in progress (a shared future every concurrent caller awaits), or done. The
//! first caller moves a tag to in progress before its first suspension point,
//! so a second caller always finds the shared future instead of starting
//! another fetch. A failed load stays recorded as failed for the lifetime of
//! the loader; only a fresh loader retries it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use flow_dom::Document;
use flow_net::ComponentSource;
use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::{FlowConfig, RouterError};

/// Outcome of a component load
pub type LoadResult = Result<(), RouterError>;

type PendingLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

enum LoadState {
    InProgress(PendingLoad),
    Done(LoadResult),
}

/// Observable load status of one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    NotStarted,
    InProgress,
    Loaded,
    Failed(RouterError),
}

/// Fetches and registers components, deduplicating concurrent requests
pub struct ComponentLoader<S> {
    document: Rc<RefCell<Document>>,
    source: Rc<S>,
    states: Rc<RefCell<HashMap<String, LoadState>>>,
}

impl<S: ComponentSource + 'static> ComponentLoader<S> {
    pub fn new(document: Rc<RefCell<Document>>, source: Rc<S>) -> Self {
        Self {
            document,
            source,
            states: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// The component source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current status of `tag`
    pub fn status(&self, tag: &str) -> LoadStatus {
        match self.states.borrow().get(tag) {
            None => LoadStatus::NotStarted,
            Some(LoadState::InProgress(_)) => LoadStatus::InProgress,
            Some(LoadState::Done(Ok(()))) => LoadStatus::Loaded,
            Some(LoadState::Done(Err(e))) => LoadStatus::Failed(e.clone()),
        }
    }

    /// Make sure `tag` is defined, fetching it from `url` if needed.
    ///
    /// Returns immediately when the tag is already registered. Otherwise every
    /// caller for the same tag shares one fetch and sees the same outcome.
    pub async fn ensure_loaded(&self, tag: &str, url: &str) -> LoadResult {
        if self.document.borrow().custom_elements().is_defined(tag) {
            tracing::debug!("Component {} is already defined", tag);
            return Ok(());
        }

        let pending = {
            let mut states = self.states.borrow_mut();
            match states.get(tag) {
                Some(LoadState::InProgress(pending)) => pending.clone(),
                Some(LoadState::Done(result)) => return result.clone(),
                None => {
                    let pending = load(
                        self.document.clone(),
                        self.source.clone(),
                        self.states.clone(),
                        tag.to_string(),
                        url.to_string(),
                    )
                    .boxed_local()
                    .shared();
                    states.insert(tag.to_string(), LoadState::InProgress(pending.clone()));
                    pending
                }
            }
        };

        pending.await
    }

    /// Load the configured essential components, one after another.
    ///
    /// Failures are logged and do not stop the remaining preloads.
    pub async fn preload_essentials(&self, config: &FlowConfig) {
        if config.essential_components.is_empty() {
            tracing::debug!("No essential components configured");
            return;
        }

        for tag in &config.essential_components {
            let url = config.component_url(tag);
            if let Err(e) = self.ensure_loaded(tag, &url).await {
                tracing::warn!("Essential component {} unavailable: {}", tag, e);
            }
        }
    }
}

async fn load<S: ComponentSource>(
    document: Rc<RefCell<Document>>,
    source: Rc<S>,
    states: Rc<RefCell<HashMap<String, LoadState>>>,
    tag: String,
    url: String,
) -> LoadResult {
    let result = fetch_and_define(&document, source.as_ref(), &tag, &url).await;
    if let Err(e) = &result {
        tracing::error!("Failed to load component {}: {}", tag, e);
    }

    states.borrow_mut().insert(tag, LoadState::Done(result.clone()));
    result
}

async fn fetch_and_define<S: ComponentSource>(
    document: &RefCell<Document>,
    source: &S,
    tag: &str,
    url: &str,
) -> LoadResult {
    tracing::debug!("Fetching component {} from URL: {}", tag, url);
    let failure = |reason: String| RouterError::LoadFailure {
        tag: tag.to_string(),
        url: url.to_string(),
        reason,
    };

    let found = source.exists(url).await.map_err(|e| failure(e.to_string()))?;
    if !found {
        return Err(RouterError::LoadNotFound {
            tag: tag.to_string(),
            url: url.to_string(),
        });
    }

    let element = source.retrieve(url).await.map_err(|e| failure(e.to_string()))?;

    let mut doc = document.borrow_mut();
    if doc.custom_elements().is_defined(tag) {
        return Ok(());
    }
    doc.define(tag, element).map_err(|e| failure(e.to_string()))?;
    tracing::info!("Component {} loaded and defined", tag);
    Ok(())
}
