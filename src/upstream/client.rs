//! `reqwest`-backed [`Fetcher`].

use super::{FetchError, Fetcher, UpstreamRequest, UpstreamResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::debug;

/// Shared outbound client. Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
        debug!("Upstream GET {}", request.url);

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::new(format!("request to {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(format!("failed to read body: {}", e)))?;

        Ok(UpstreamResponse {
            status: status.into(),
            headers,
            body,
        })
    }
}
