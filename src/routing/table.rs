//! Route table mapping inbound request paths to relay functions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A route entry that maps a path to a function.
///
/// Routes match on path only; method handling (CORS preflight, 405) belongs
/// to the relay itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route path (e.g., "/api/onesignal/app").
    pub path: String,
    /// Target function ID.
    pub function_id: String,
}

impl Route {
    /// Create a new route.
    pub fn new(path: impl Into<String>, function_id: impl Into<String>) -> Self {
        Self {
            path: normalize(&path.into()).to_string(),
            function_id: function_id.into(),
        }
    }

    /// Check if this route matches the given request path.
    pub fn matches(&self, path: &str) -> bool {
        self.path == normalize(path)
    }
}

/// `/api/x/` and `/api/x` address the same function.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Route table for routing requests to functions.
#[derive(Default)]
pub struct RouteTable {
    routes: Arc<RwLock<Vec<Route>>>,
}

impl RouteTable {
    /// Create a new route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route to the table. A later route for the same path replaces the
    /// earlier one.
    pub async fn add(&self, route: Route) {
        let mut routes = self.routes.write().await;
        routes.retain(|r| r.path != route.path);
        routes.push(route);
    }

    /// Find a matching route for the given path.
    pub async fn find(&self, path: &str) -> Option<Route> {
        let routes = self.routes.read().await;
        routes.iter().find(|r| r.matches(path)).cloned()
    }

    /// List all routes.
    pub async fn list(&self) -> Vec<Route> {
        let routes = self.routes.read().await;
        routes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_exact_match() {
        let route = Route::new("/api/onesignal/app", "onesignal-app");

        assert!(route.matches("/api/onesignal/app"));
        assert!(route.matches("/api/onesignal/app/"));
        assert_eq!(Route::new("/api/image-proxy/", "image-proxy").path, "/api/image-proxy");
        assert!(!route.matches("/api/onesignal"));
        assert!(!route.matches("/api/onesignal/app/extra"));
    }

    #[tokio::test]
    async fn test_route_table_add_and_find() {
        let table = RouteTable::new();

        table.add(Route::new("/api/onesignal/app", "onesignal-app")).await;
        table.add(Route::new("/api/onesignal/players", "onesignal-players")).await;

        let route = table.find("/api/onesignal/players").await;
        assert_eq!(route.unwrap().function_id, "onesignal-players");
        assert!(table.find("/api/unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_route_table_replaces_same_path() {
        let table = RouteTable::new();

        table.add(Route::new("/api/image-proxy", "old")).await;
        table.add(Route::new("/api/image-proxy", "image-proxy")).await;
        assert_eq!(table.list().await.len(), 1);
        assert_eq!(
            table.find("/api/image-proxy").await.unwrap().function_id,
            "image-proxy"
        );
    }
}
