//! Function registry for managing relay functions.

use crate::function::handler::{FunctionContext, RelayError, RelayFunction};
use crate::function::manifest::FunctionManifest;
use crate::http::{RelayRequest, RelayResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Registry of relay functions keyed by name.
///
/// Functions are stateless, so invocations only take a read lock long enough
/// to clone the `Arc` and run concurrently afterwards.
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, Arc<dyn RelayFunction>>>,
}

impl FunctionRegistry {
    /// Create a new function registry.
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new function under `name`.
    pub async fn register(
        &self,
        name: impl Into<String>,
        function: Arc<dyn RelayFunction>,
    ) -> Result<(), RelayError> {
        let name = name.into();
        let mut functions = self.functions.write().await;

        if functions.contains_key(&name) {
            return Err(RelayError::new(format!(
                "Function '{}' is already registered",
                name
            )));
        }

        functions.insert(name.clone(), function);
        info!("Registered function: {}", name);
        Ok(())
    }

    /// Execute a function.
    pub async fn execute(
        &self,
        name: &str,
        request: RelayRequest,
        request_id: &str,
    ) -> Result<RelayResponse, RelayError> {
        let function = self
            .get(name)
            .await
            .ok_or_else(|| RelayError::not_found(format!("Function '{}' not found", name)))?;

        let context = FunctionContext::new(name, request_id);
        debug!("Executing function '{}' [{}]", name, request_id);
        function.fetch(request, &context).await
    }

    /// Look up a function by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn RelayFunction>> {
        let functions = self.functions.read().await;
        functions.get(name).cloned()
    }

    /// List all registered functions with their manifests, sorted by name.
    pub async fn list(&self) -> Vec<(String, &'static FunctionManifest)> {
        let functions = self.functions.read().await;
        let mut entries: Vec<_> = functions
            .iter()
            .map(|(name, function)| (name.clone(), function.manifest()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
