use super::{relay_json, Credentials, OneSignalConfig};
use crate::function::{FunctionContext, FunctionManifest, RelayError, RelayFunction};
use crate::http::{RelayRequest, RelayResponse};
use crate::upstream::{Fetcher, UpstreamRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub static APP_INFO_MANIFEST: FunctionManifest =
    FunctionManifest::new("onesignal-app", "v1", "/api/onesignal/app")
        .with_description("OneSignal app metadata (GET /apps/{app_id})");

/// Relays `GET /apps/{app_id}` with a `Key` authorization header.
pub struct AppInfoRelay {
    config: OneSignalConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl AppInfoRelay {
    pub fn new(config: OneSignalConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }
}

fn app_request(
    _request: &RelayRequest,
    config: &OneSignalConfig,
    credentials: Credentials<'_>,
) -> Result<UpstreamRequest, RelayError> {
    Ok(
        UpstreamRequest::get(format!("{}/apps/{}", config.api_url, credentials.app_id))
            .header("Authorization", format!("Key {}", credentials.rest_api_key)),
    )
}

#[async_trait]
impl RelayFunction for AppInfoRelay {
    async fn fetch(
        &self,
        request: RelayRequest,
        ctx: &FunctionContext,
    ) -> Result<RelayResponse, RelayError> {
        Ok(relay_json(&self.config, self.fetcher.as_ref(), request, ctx, app_request).await)
    }

    fn manifest(&self) -> &'static FunctionManifest {
        &APP_INFO_MANIFEST
    }
}
