//! Relay HTTP request type providing a fetch-like API.

use crate::function::RelayError;
use bytes::Bytes;
use std::collections::HashMap;

/// HTTP method enumeration.
///
/// Verbs outside the common set are kept as [`Method::Other`] so a relay can
/// reject them instead of treating them as `GET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other(String),
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Other(verb) => write!(f, "{}", verb),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            ref other => Method::Other(other.as_str().to_string()),
        }
    }
}

/// Fetch-like HTTP request handed to relay functions.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path with its optional `?query` suffix.
    pub url: String,
    /// HTTP headers, names lower-cased.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl RelayRequest {
    /// Create a new RelayRequest.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Path component of the request URL.
    pub fn path(&self) -> &str {
        match self.url.split_once('?') {
            Some((path, _)) => path,
            None => &self.url,
        }
    }

    /// Raw, still-encoded query string (empty when absent).
    pub fn query_string(&self) -> &str {
        self.url
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or("")
    }

    /// Decoded query pairs in the order they appear.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>, RelayError> {
        serde_urlencoded::from_str(self.query_string())
            .map_err(|e| RelayError::bad_request(format!("invalid query string: {}", e)))
    }

    /// First decoded value for `name`. A key given without a value yields
    /// `Some("")`, distinct from an absent key.
    pub fn query_param(&self, name: &str) -> Result<Option<String>, RelayError> {
        Ok(self
            .query_pairs()?
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value))
    }
}

impl Default for RelayRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}
