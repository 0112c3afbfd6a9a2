//! # relayfn - fetch-style relay functions
//!
//! A small runtime hosting three stateless relays. Each one turns a single
//! inbound HTTP request into at most one outbound call and hands the upstream
//! answer back with light header rewriting:
//!
//! | Path                      | Relay            | Upstream |
//! |---------------------------|------------------|----------|
//! | `/api/image-proxy?url=`   | [`ImageRelay`]   | any URL (optional host allow-list) |
//! | `/api/onesignal/app`      | [`AppInfoRelay`] | `GET {api}/apps/{app_id}` |
//! | `/api/onesignal/players`  | [`PlayersRelay`] | `GET {api}/players?app_id=&limit=&offset=` |
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         RelayServer                           │
//! │   hyper http1  ──▶  RouteTable  ──▶  FunctionRegistry         │
//! │                                        │                      │
//! │         ┌──────────────┬───────────────┼──────────────┐       │
//! │         ▼              ▼               ▼              │       │
//! │    ImageRelay     AppInfoRelay    PlayersRelay        │       │
//! │         └──────────────┴───────┬───────┘              │       │
//! │                                ▼                      │       │
//! │                      Fetcher (reqwest)                │       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relayfn::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new());
//!     let onesignal = OneSignalConfig::new("app-id", "rest-api-key");
//!
//!     let server = RelayServer::with_defaults();
//!     server.register_function(Arc::new(ImageRelay::new(fetcher.clone()))).await?;
//!     server
//!         .register_function(Arc::new(AppInfoRelay::new(onesignal.clone(), fetcher.clone())))
//!         .await?;
//!     server
//!         .register_function(Arc::new(PlayersRelay::new(onesignal, fetcher)))
//!         .await?;
//!
//!     server.run().await
//! }
//! ```

pub mod function;
pub mod http;
pub mod relays;
pub mod routing;
pub mod runtime;
pub mod upstream;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::function::{FunctionContext, FunctionRegistry, RelayError, RelayFunction};
    pub use crate::http::{Method, RelayRequest, RelayResponse, StatusCode};
    pub use crate::relays::{AppInfoRelay, ImageRelay, OneSignalConfig, PlayersRelay};
    pub use crate::runtime::{RelayServer, RuntimeConfig};
    pub use crate::upstream::{Fetcher, ReqwestFetcher};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use function::{FunctionContext, FunctionRegistry, RelayError, RelayFunction};
pub use http::{RelayRequest, RelayResponse};
pub use relays::{AppInfoRelay, ImageRelay, OneSignalConfig, PlayersRelay};
pub use runtime::{RelayServer, RuntimeConfig};
