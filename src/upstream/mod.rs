//! Outbound HTTP: the single upstream call each relay makes.
//!
//! Relays talk to a [`Fetcher`] rather than a concrete client so they can be
//! exercised against a scripted upstream.

mod client;

pub use client::ReqwestFetcher;

use crate::http::StatusCode;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

/// An outbound GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Absolute target URL.
    pub url: String,
    /// Extra request headers, sent in order.
    pub headers: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Create a GET for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Upstream status code.
    pub status: StatusCode,
    /// Response headers, names lower-cased.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Create a response with the given status and body.
    pub fn new(status: impl Into<StatusCode>, body: impl Into<Bytes>) -> Self {
        Self {
            status: status.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Performs outbound requests on behalf of a relay.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue `request` and buffer the full response.
    async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, FetchError>;
}

/// Error type for outbound calls (connect, DNS, TLS, body read, bad URL).
#[derive(Debug, Clone)]
pub struct FetchError {
    /// Error message.
    pub message: String,
}

impl FetchError {
    /// Create a new fetch error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FetchError: {}", self.message)
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fetcher used by relay unit tests.

    use super::*;
    use std::sync::Mutex;

    /// Replies with a canned result and records every request it sees.
    pub(crate) struct ScriptedFetcher {
        reply: Result<UpstreamResponse, FetchError>,
        seen: Mutex<Vec<UpstreamRequest>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn replying(response: UpstreamResponse) -> Self {
            Self {
                reply: Ok(response),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                reply: Err(FetchError::new(message)),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> Vec<UpstreamRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }
}
