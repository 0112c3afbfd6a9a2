//! Image relay: fetch a caller-supplied URL and hand its bytes back with
//! permissive CORS headers, so browsers can draw cross-origin images onto a
//! canvas.
//!
//! By default any target is fetched (open proxy). Deployments that need to
//! restrict this configure an allow-list of hosts.

use crate::function::{FunctionContext, FunctionManifest, RelayError, RelayFunction};
use crate::http::{RelayRequest, RelayResponse, StatusCode};
use crate::relays::cors::IMAGE_CORS;
use crate::upstream::{Fetcher, UpstreamRequest};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub static IMAGE_PROXY_MANIFEST: FunctionManifest =
    FunctionManifest::new("image-proxy", "v1", "/api/image-proxy")
        .with_description("Fetches ?url= and returns its bytes with CORS headers");

pub const MISSING_URL_MESSAGE: &str = "Missing url query parameter";
pub const PROXY_FAILED_MESSAGE: &str = "Image proxy failed";
pub const HOST_NOT_ALLOWED_MESSAGE: &str = "Target host not allowed";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct ImageRelay {
    fetcher: Arc<dyn Fetcher>,
    allowed_hosts: Vec<String>,
}

impl ImageRelay {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            allowed_hosts: Vec::new(),
        }
    }

    /// Restrict targets to the given hosts (exact, case-insensitive). An
    /// empty list keeps the relay open.
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|host| host.as_ref().trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        self
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    fn permits(&self, target: &str) -> Result<bool, RelayError> {
        if self.allowed_hosts.is_empty() {
            return Ok(true);
        }

        let url = Url::parse(target)
            .map_err(|e| RelayError::new(format!("invalid target url '{}': {}", target, e)))?;
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        Ok(self.allowed_hosts.iter().any(|allowed| *allowed == host))
    }

    async fn relay(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError> {
        let raw = match request.query_param("url")? {
            Some(raw) => raw,
            None => {
                return Ok(RelayResponse::error(
                    StatusCode::BAD_REQUEST,
                    MISSING_URL_MESSAGE,
                ))
            }
        };

        // The query layer already decoded once; targets arrive encoded a
        // second time by callers that wrap a fully encoded URL.
        if let Some(at) = malformed_escape(&raw) {
            return Err(RelayError::new(format!(
                "malformed percent escape at byte {} in '{}'",
                at, raw
            )));
        }
        let target = urlencoding::decode(&raw)?.into_owned();

        if !self.permits(&target)? {
            warn!("Rejected image proxy target outside allow-list: {}", target);
            return Ok(RelayResponse::error(
                StatusCode::FORBIDDEN,
                HOST_NOT_ALLOWED_MESSAGE,
            ));
        }

        let upstream = self.fetcher.fetch(UpstreamRequest::get(&target)).await?;

        if !upstream.status.is_success() {
            debug!("Upstream {} answered {}", target, upstream.status);
            return Ok(RelayResponse::error(
                upstream.status,
                format!("Upstream error {}", upstream.status),
            ));
        }

        let content_type = upstream
            .get_header("content-type")
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(RelayResponse::bytes(content_type, upstream.body).with_headers(IMAGE_CORS))
    }
}

/// Position of the first `%` not followed by two hex digits.
/// `urlencoding::decode` passes such sequences through unchanged.
fn malformed_escape(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    let is_hex = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_hexdigit);
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == b'%' && !(is_hex(i + 1) && is_hex(i + 2)))
        .map(|(i, _)| i)
}

#[async_trait]
impl RelayFunction for ImageRelay {
    async fn fetch(
        &self,
        request: RelayRequest,
        ctx: &FunctionContext,
    ) -> Result<RelayResponse, RelayError> {
        match self.relay(&request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("Image proxy error: {} [{}]", e, ctx.request_id);
                Ok(RelayResponse::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PROXY_FAILED_MESSAGE,
                ))
            }
        }
    }

    fn manifest(&self) -> &'static FunctionManifest {
        &IMAGE_PROXY_MANIFEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::upstream::testing::ScriptedFetcher;
    use crate::upstream::UpstreamResponse;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

    fn ctx() -> FunctionContext {
        FunctionContext::new("image-proxy", "req-test")
    }

    fn get(url: &str) -> RelayRequest {
        RelayRequest::new(Method::Get, url)
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, "")));
        let relay = ImageRelay::new(fetcher.clone());

        let response = relay.fetch(get("/api/image-proxy"), &ctx()).await.unwrap();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.text_body().as_deref(),
            Some(r#"{"error":"Missing url query parameter"}"#)
        );
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_proxies_bytes_and_content_type() {
        let fetcher = Arc::new(ScriptedFetcher::replying(
            UpstreamResponse::new(200u16, PNG).header("Content-Type", "image/png"),
        ));
        let relay = ImageRelay::new(fetcher.clone());

        let response = relay
            .fetch(
                get("/api/image-proxy?url=https%3A%2F%2Fcdn.example.com%2Flogo.png"),
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_deref(), Some(PNG));
        assert_eq!(
            response.get_header("Content-Type").map(String::as_str),
            Some("image/png")
        );
        assert_eq!(
            response.get_header("Access-Control-Allow-Origin").map(String::as_str),
            Some("*")
        );
        assert_eq!(
            response.get_header("Access-Control-Allow-Methods").map(String::as_str),
            Some("GET, OPTIONS")
        );
        assert_eq!(
            response.get_header("Access-Control-Allow-Headers").map(String::as_str),
            Some("Content-Type")
        );
        assert_eq!(fetcher.requests()[0].url, "https://cdn.example.com/logo.png");
    }

    #[tokio::test]
    async fn test_double_encoded_target_is_decoded_twice() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, "x")));
        let relay = ImageRelay::new(fetcher.clone());

        relay
            .fetch(
                get("/api/image-proxy?url=https%253A%252F%252Fcdn.example.com%252Fa.png"),
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(fetcher.requests()[0].url, "https://cdn.example.com/a.png");
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_octet_stream() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, PNG)));
        let relay = ImageRelay::new(fetcher);

        let response = relay
            .fetch(get("/api/image-proxy?url=https://cdn.example.com/raw"), &ctx())
            .await
            .unwrap();

        assert_eq!(
            response.get_header("Content-Type").map(String::as_str),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_upstream_status_is_mirrored() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(
            404u16,
            "not here",
        )));
        let relay = ImageRelay::new(fetcher);

        let response = relay
            .fetch(get("/api/image-proxy?url=https://cdn.example.com/gone.png"), &ctx())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.text_body().as_deref(),
            Some(r#"{"error":"Upstream error 404"}"#)
        );
    }

    #[tokio::test]
    async fn test_network_failure_is_internal_error() {
        let fetcher = Arc::new(ScriptedFetcher::failing("dns error: no such host"));
        let relay = ImageRelay::new(fetcher);

        let response = relay
            .fetch(get("/api/image-proxy?url=https://nowhere.invalid/a.png"), &ctx())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.text_body().as_deref(),
            Some(r#"{"error":"Image proxy failed"}"#)
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_after_decoding_is_internal_error() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, "")));
        let relay = ImageRelay::new(fetcher.clone());

        // %25FF decodes to %FF, which is not valid UTF-8 on the second pass.
        let response = relay
            .fetch(get("/api/image-proxy?url=%25FF"), &ctx())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_escape_after_decoding_is_internal_error() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, PNG)));
        let relay = ImageRelay::new(fetcher.clone());

        for url in [
            // https://cdn.example.com/100%
            "/api/image-proxy?url=https%3A%2F%2Fcdn.example.com%2F100%25",
            // https://cdn.example.com/a%zz.png
            "/api/image-proxy?url=https%3A%2F%2Fcdn.example.com%2Fa%25zz.png",
        ] {
            let response = relay.fetch(get(url), &ctx()).await.unwrap();

            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response.text_body().as_deref(),
                Some(r#"{"error":"Image proxy failed"}"#)
            );
        }
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_malformed_escape_positions() {
        assert_eq!(malformed_escape("https://cdn.example.com/a%2Fb"), None);
        assert_eq!(malformed_escape("no-escapes"), None);
        assert_eq!(malformed_escape("100%"), Some(3));
        assert_eq!(malformed_escape("a%4"), Some(1));
        assert_eq!(malformed_escape("%41%g1"), Some(3));
    }

    #[tokio::test]
    async fn test_allow_list_rejects_other_hosts() {
        let fetcher = Arc::new(ScriptedFetcher::replying(UpstreamResponse::new(200u16, PNG)));
        let relay = ImageRelay::new(fetcher.clone()).with_allowed_hosts(["CDN.example.com", " "]);
        assert_eq!(relay.allowed_hosts(), ["cdn.example.com".to_string()]);

        let rejected = relay
            .fetch(get("/api/image-proxy?url=http://169.254.169.254/latest"), &ctx())
            .await
            .unwrap();
        assert_eq!(rejected.status, StatusCode::FORBIDDEN);
        assert!(fetcher.requests().is_empty());

        let allowed = relay
            .fetch(get("/api/image-proxy?url=https://cdn.example.com/a.png"), &ctx())
            .await
            .unwrap();
        assert_eq!(allowed.status, StatusCode::OK);
        assert_eq!(fetcher.requests().len(), 1);
    }
}
