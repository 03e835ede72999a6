//! HTTP component source
//!
//! The blocking client runs on smol's blocking pool so the cooperative
//! scheduler keeps running other navigations while a request is in flight.

use std::rc::Rc;

use flow_dom::CustomElement;
use reqwest::blocking::Client;
use url::Url;

use crate::{ComponentModule, ComponentSource, NetError};

/// Fetches component modules from a web server
pub struct HttpSource {
    client: Client,
    origin: Url,
}

impl HttpSource {
    /// Create a source resolving relative URLs against `origin`
    pub fn new(origin: &str) -> Result<Self, NetError> {
        let origin = Url::parse(origin).map_err(|e| NetError::InvalidUrl(format!("{origin}: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!("flow-router/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;

        Ok(Self { client, origin })
    }

    /// Absolute URL for a possibly relative component path
    pub fn resolve(&self, url: &str) -> Result<Url, NetError> {
        self.origin.join(url).map_err(|e| NetError::InvalidUrl(format!("{url}: {e}")))
    }

    async fn send(&self, method: reqwest::Method, url: &str) -> Result<(u16, Vec<u8>), NetError> {
        let url = self.resolve(url)?;
        let client = self.client.clone();
        tracing::debug!("HTTP {} {}", method, url);

        smol::unblock(move || {
            let response = client.request(method, url.as_str()).send()
                .map_err(|e| NetError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response.bytes()
                .map_err(|e| NetError::Network(e.to_string()))?;
            Ok((status, body.to_vec()))
        }).await
    }
}

impl ComponentSource for HttpSource {
    async fn exists(&self, url: &str) -> Result<bool, NetError> {
        let (status, _) = self.send(reqwest::Method::HEAD, url).await?;
        Ok((200..300).contains(&status))
    }

    async fn retrieve(&self, url: &str) -> Result<Rc<dyn CustomElement>, NetError> {
        let (status, body) = self.send(reqwest::Method::GET, url).await?;
        if !(200..300).contains(&status) {
            return Err(NetError::HttpError { status });
        }
        ComponentModule::parse(&body)?.into_element()
    }
}
