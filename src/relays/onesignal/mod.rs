//! Pass-through relays for the OneSignal REST API.
//!
//! Both relays share the same gate: `OPTIONS` answers a bare 200, anything
//! other than `GET` is a 405, and missing credentials are a 500 that never
//! reaches the network. Past the gate the upstream JSON and status are handed
//! back untouched.

mod app;
mod players;

pub use app::{AppInfoRelay, APP_INFO_MANIFEST};
pub use players::{PlayersRelay, DEFAULT_LIMIT, DEFAULT_OFFSET, PLAYERS_MANIFEST};

use crate::function::{FunctionContext, RelayError};
use crate::http::{Method, RelayRequest, RelayResponse, StatusCode};
use crate::relays::cors::ONESIGNAL_CORS;
use crate::upstream::{Fetcher, UpstreamRequest};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const DEFAULT_API_URL: &str = "https://onesignal.com/api/v1";

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const CONFIG_MISSING_MESSAGE: &str = "OneSignal configuration is missing";
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error";

pub const APP_ID_ENV: &str = "ONESIGNAL_APP_ID";
pub const REST_API_KEY_ENV: &str = "ONESIGNAL_REST_API_KEY";
pub const API_URL_ENV: &str = "ONESIGNAL_API_URL";

/// Credentials and endpoint for the OneSignal REST API.
///
/// Values are injected at construction; relays never read the process
/// environment themselves. Empty strings count as missing.
#[derive(Clone, Serialize, Deserialize)]
pub struct OneSignalConfig {
    /// Application identifier.
    pub app_id: String,
    /// REST API key. Never serialized.
    #[serde(skip_serializing, default)]
    pub rest_api_key: String,
    /// API base URL without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for OneSignalConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            rest_api_key: String::new(),
            api_url: default_api_url(),
        }
    }
}

impl std::fmt::Debug for OneSignalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneSignalConfig")
            .field("app_id", &self.app_id)
            .field("rest_api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl OneSignalConfig {
    /// Create a config for the public API.
    pub fn new(app_id: impl Into<String>, rest_api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            rest_api_key: rest_api_key.into(),
            ..Self::default()
        }
    }

    /// Point the relays at a different API base.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `ONESIGNAL_APP_ID`, `ONESIGNAL_REST_API_KEY` and, optionally,
    /// `ONESIGNAL_API_URL`. Unset secrets are left empty so the relays
    /// report the missing configuration per request.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`OneSignalConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::new(
            lookup(APP_ID_ENV).unwrap_or_default(),
            lookup(REST_API_KEY_ENV).unwrap_or_default(),
        );
        let config = match lookup(API_URL_ENV) {
            Some(url) if !url.trim().is_empty() => config.api_url(url.trim()),
            _ => config,
        };

        if config.credentials().is_none() {
            warn!(
                "{} or {} is not set; OneSignal relays will answer 500",
                APP_ID_ENV, REST_API_KEY_ENV
            );
        }
        config
    }

    /// Both secrets, when both are present and non-empty.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        if self.app_id.is_empty() || self.rest_api_key.is_empty() {
            return None;
        }
        Some(Credentials {
            app_id: &self.app_id,
            rest_api_key: &self.rest_api_key,
        })
    }
}

/// Borrowed view of a complete credential pair.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub app_id: &'a str,
    pub rest_api_key: &'a str,
}

/// Outcome of the method and configuration checks.
enum Gate<'a> {
    Respond(RelayResponse),
    Proceed(Credentials<'a>),
}

fn gate<'a>(request: &RelayRequest, config: &'a OneSignalConfig) -> Gate<'a> {
    match request.method {
        Method::Options => return Gate::Respond(RelayResponse::ok().with_headers(ONESIGNAL_CORS)),
        Method::Get => {}
        _ => {
            return Gate::Respond(
                RelayResponse::error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
                    .with_headers(ONESIGNAL_CORS),
            )
        }
    }

    match config.credentials() {
        Some(credentials) => Gate::Proceed(credentials),
        None => Gate::Respond(
            RelayResponse::error(StatusCode::INTERNAL_SERVER_ERROR, CONFIG_MISSING_MESSAGE)
                .with_headers(ONESIGNAL_CORS),
        ),
    }
}

/// Run the gate, build the upstream call, and forward its JSON.
async fn relay_json<F>(
    config: &OneSignalConfig,
    fetcher: &dyn Fetcher,
    request: RelayRequest,
    ctx: &FunctionContext,
    build: F,
) -> RelayResponse
where
    F: FnOnce(&RelayRequest, &OneSignalConfig, Credentials<'_>) -> Result<UpstreamRequest, RelayError>,
{
    let credentials = match gate(&request, config) {
        Gate::Respond(response) => return response,
        Gate::Proceed(credentials) => credentials,
    };

    let result = match build(&request, config, credentials) {
        Ok(upstream) => forward(fetcher, upstream).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => response.with_headers(ONESIGNAL_CORS),
        Err(e) => {
            error!(
                "OneSignal relay '{}' error: {} [{}]",
                ctx.function_name, e, ctx.request_id
            );
            RelayResponse::error(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
                .with_headers(ONESIGNAL_CORS)
        }
    }
}

/// Issue the call and hand back the upstream JSON under the upstream status.
async fn forward(
    fetcher: &dyn Fetcher,
    upstream: UpstreamRequest,
) -> Result<RelayResponse, RelayError> {
    let response = fetcher.fetch(upstream).await?;
    serde_json::from_slice::<serde_json::Value>(&response.body)?;
    Ok(RelayResponse::json_bytes(response.status, response.body))
}
