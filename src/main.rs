//! relayfn server binary.
//!
//! Reads configuration from the environment, mounts the image relay and the
//! two OneSignal relays, and serves them.

use relayfn::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting relayfn server...");

    let config = RuntimeConfig::from_env()?;
    let onesignal = OneSignalConfig::from_env();
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new());

    if config.image_allowed_hosts.is_empty() {
        tracing::warn!("Image relay will fetch any URL; set IMAGE_PROXY_ALLOWED_HOSTS to restrict it");
    }

    let image = ImageRelay::new(fetcher.clone()).with_allowed_hosts(&config.image_allowed_hosts);
    let server = RelayServer::new(config);

    server.register_function(Arc::new(image)).await?;
    server
        .register_function(Arc::new(AppInfoRelay::new(onesignal.clone(), fetcher.clone())))
        .await?;
    server
        .register_function(Arc::new(PlayersRelay::new(onesignal, fetcher)))
        .await?;

    tracing::info!("Try: curl 'http://localhost:8080/api/image-proxy?url=https%3A%2F%2Fexample.com%2Flogo.png'");
    tracing::info!("Try: curl http://localhost:8080/api/onesignal/app");
    tracing::info!("Try: curl 'http://localhost:8080/api/onesignal/players?limit=5'");
    tracing::info!("Health check: curl http://localhost:8080/_health");

    server.run().await
}
