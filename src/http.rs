// src/http.rs

use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::Result;

/// A fetched response. Status handling is left to the caller, since the
/// feature service, the roll lookup and the print page each treat it differently.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

/// The only thing the pipeline needs from the network: GET a URL, get text back.
pub trait Transport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<Response>> + Send;
}

/// `reqwest`-backed transport used by the binaries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Response> {
        debug!("GET {}", url);
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(%url, %status, bytes = body.len(), "response");
        Ok(Response { status, body })
    }
}
