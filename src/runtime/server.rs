//! Relay HTTP server implementation.

use crate::function::{FunctionRegistry, RelayError, RelayFunction};
use crate::http::{Method, RelayRequest, RelayResponse, StatusCode};
use crate::routing::{Route, RouteTable};
use crate::runtime::RuntimeConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// State shared by every connection task.
struct ServerState {
    config: RuntimeConfig,
    registry: Arc<FunctionRegistry>,
    routes: Arc<RouteTable>,
}

/// Relay server.
///
/// Accepts HTTP/1 connections, resolves the request path through the route
/// table and hands the request to the registered relay function. Each relay
/// is mounted at the path named in its manifest.
pub struct RelayServer {
    /// Server configuration.
    config: RuntimeConfig,
    /// Function registry.
    registry: Arc<FunctionRegistry>,
    /// Path to function mapping.
    routes: Arc<RouteTable>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            registry: Arc::new(FunctionRegistry::new()),
            routes: Arc::new(RouteTable::new()),
        }
    }

    /// Create a new relay server with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RuntimeConfig::default())
    }

    /// Get the function registry.
    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    /// Get the route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.routes.clone()
    }

    /// Register a function and mount it at its manifest path.
    pub async fn register_function(
        &self,
        function: Arc<dyn RelayFunction>,
    ) -> Result<(), RelayError> {
        let manifest = function.manifest();
        self.registry.register(manifest.id, function).await?;
        self.routes.add(Route::new(manifest.path, manifest.id)).await;
        info!("Mounted '{}' at {}", manifest.id, manifest.path);
        Ok(())
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Relay server listening on {}", listener.local_addr()?);
        for route in self.routes.list().await {
            info!("  {} -> {}", route.path, route.function_id);
        }

        let state = Arc::new(ServerState {
            config: self.config,
            registry: self.registry,
            routes: self.routes,
        });

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let state = state.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let state = state.clone();
                    async move { handle_request(req, state, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    // Handle system endpoints
    if state.config.enable_health && path == "/_health" {
        return Ok(build_response(RelayResponse::text("OK")));
    }

    if state.config.enable_metrics && path == "/_metrics" {
        return Ok(build_response(metrics_response(&state.registry).await));
    }

    let route = match state.routes.find(&path).await {
        Some(route) => route,
        None => {
            debug!("No route for {} [{}]", path, request_id);
            return Ok(build_response(RelayResponse::error(
                StatusCode::NOT_FOUND,
                format!("No function registered for {}", path),
            )));
        }
    };

    let relay_request = match convert_request(req, state.config.max_body_size).await {
        Ok(req) => req,
        Err(e) => {
            warn!("Failed to convert request: {} [{}]", e, request_id);
            return Ok(build_response(e.into()));
        }
    };

    match state
        .registry
        .execute(&route.function_id, relay_request, &request_id)
        .await
    {
        Ok(response) => {
            debug!(
                "Function '{}' answered {} [{}]",
                route.function_id, response.status, request_id
            );
            Ok(build_response(response))
        }
        Err(e) => {
            error!(
                "Function '{}' error: {} [{}]",
                route.function_id, e, request_id
            );
            Ok(build_response(e.into()))
        }
    }
}

/// Listing of registered functions for `/_metrics`.
async fn metrics_response(registry: &FunctionRegistry) -> RelayResponse {
    let functions = registry.list().await;
    let metrics = serde_json::json!({
        "functions": functions.iter().map(|(name, manifest)| {
            serde_json::json!({
                "name": name,
                "version": manifest.version,
                "path": manifest.path,
                "description": manifest.description,
            })
        }).collect::<Vec<_>>()
    });
    RelayResponse::json(&metrics).unwrap_or_else(|_| RelayResponse::json_bytes(200u16, "{}"))
}

/// Convert a hyper Request to RelayRequest.
async fn convert_request(
    req: Request<Incoming>,
    max_body_size: usize,
) -> Result<RelayRequest, RelayError> {
    let method = Method::from(req.method());
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body_bytes = Limited::new(req.into_body(), max_body_size)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                RelayError::with_code(
                    StatusCode::PAYLOAD_TOO_LARGE.0,
                    "Request body too large",
                )
            } else {
                RelayError::bad_request(format!("Failed to read request body: {}", e))
            }
        })?
        .to_bytes();

    let body = if body_bytes.is_empty() {
        None
    } else {
        Some(body_bytes)
    };

    Ok(RelayRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Build a hyper Response from RelayResponse.
fn build_response(relay_response: RelayResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(relay_response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            relay_response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);

    for (name, value) in relay_response.headers {
        builder = builder.header(name, value);
    }

    let body = relay_response.body.unwrap_or_default();
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        let mut fallback = Response::new(Full::new(Bytes::from_static(
            br#"{"error":"Internal server error"}"#,
        )));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", timestamp, sequence)
}
