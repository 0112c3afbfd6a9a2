use super::{relay_json, Credentials, OneSignalConfig};
use crate::function::{FunctionContext, FunctionManifest, RelayError, RelayFunction};
use crate::http::{RelayRequest, RelayResponse};
use crate::upstream::{Fetcher, UpstreamRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub static PLAYERS_MANIFEST: FunctionManifest =
    FunctionManifest::new("onesignal-players", "v1", "/api/onesignal/players")
        .with_description("OneSignal device listing (GET /players?app_id=&limit=&offset=)");

pub const DEFAULT_LIMIT: &str = "10";
pub const DEFAULT_OFFSET: &str = "0";

/// Relays `GET /players` with caller-supplied paging.
///
/// `limit` and `offset` are spliced into the upstream query unvalidated.
/// The authorization header is `Basic <rest key>` with the raw key, unlike
/// the app relay's `Key <rest key>`; existing deployments depend on it.
pub struct PlayersRelay {
    config: OneSignalConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl PlayersRelay {
    pub fn new(config: OneSignalConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }
}

fn players_request(
    request: &RelayRequest,
    config: &OneSignalConfig,
    credentials: Credentials<'_>,
) -> Result<UpstreamRequest, RelayError> {
    let limit = request
        .query_param("limit")?
        .unwrap_or_else(|| DEFAULT_LIMIT.to_string());
    let offset = request
        .query_param("offset")?
        .unwrap_or_else(|| DEFAULT_OFFSET.to_string());

    let url = format!(
        "{}/players?app_id={}&limit={}&offset={}",
        config.api_url, credentials.app_id, limit, offset
    );
    Ok(UpstreamRequest::get(url)
        .header("Authorization", format!("Basic {}", credentials.rest_api_key)))
}

#[async_trait]
impl RelayFunction for PlayersRelay {
    async fn fetch(
        &self,
        request: RelayRequest,
        ctx: &FunctionContext,
    ) -> Result<RelayResponse, RelayError> {
        Ok(relay_json(&self.config, self.fetcher.as_ref(), request, ctx, players_request).await)
    }

    fn manifest(&self) -> &'static FunctionManifest {
        &PLAYERS_MANIFEST
    }
}
