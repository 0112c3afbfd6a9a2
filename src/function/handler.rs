//! Relay function trait, invocation context and error type.

use crate::function::manifest::FunctionManifest;
use crate::http::{RelayRequest, RelayResponse};
use crate::upstream::FetchError;
use async_trait::async_trait;

/// Per-invocation context passed to relay functions.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Function name.
    pub function_name: String,
    /// Request ID for tracing.
    pub request_id: String,
}

impl FunctionContext {
    /// Create a new function context.
    pub fn new(function_name: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            request_id: request_id.into(),
        }
    }
}

/// A stateless relay: one inbound request in, one response out.
///
/// Implementations receive everything they need (configuration, outbound
/// client) at construction and must not share mutable state between
/// invocations.
#[async_trait]
pub trait RelayFunction: Send + Sync {
    /// Handle an incoming HTTP request (fetch event).
    async fn fetch(
        &self,
        request: RelayRequest,
        ctx: &FunctionContext,
    ) -> Result<RelayResponse, RelayError>;

    /// Static metadata: id, version and mount path.
    fn manifest(&self) -> &'static FunctionManifest;

    /// Get the function name.
    fn name(&self) -> &str {
        self.manifest().id
    }
}

/// Relay function error type.
#[derive(Debug, Clone)]
pub struct RelayError {
    /// Error message.
    pub message: String,
    /// HTTP status code to surface.
    pub code: u16,
}

impl RelayError {
    /// Create a new RelayError.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 500,
        }
    }

    /// Create a RelayError with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RelayError {}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        RelayResponse::error(err.code, err.message)
    }
}

impl From<FetchError> for RelayError {
    fn from(err: FetchError) -> Self {
        RelayError::new(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::new(format!("invalid JSON: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for RelayError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        RelayError::new(format!("invalid UTF-8: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn test_error_converts_to_json_response() {
        let response: RelayResponse = RelayError::not_found("No function registered for /x").into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.text_body().as_deref(),
            Some(r#"{"error":"No function registered for /x"}"#)
        );
    }

    #[test]
    fn test_fetch_error_is_internal() {
        let err: RelayError = FetchError::new("dns failure").into();
        assert_eq!(err.code, 500);
        assert!(err.message.contains("dns failure"));
    }
}
