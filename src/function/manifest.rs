//! Function manifest for compile-time metadata.
//!
//! Every relay carries a static manifest naming where it is mounted. The
//! runtime builds its route table and `/_metrics` listing from these.

use serde::Serialize;

/// Function manifest containing metadata for a relay function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionManifest {
    /// Unique identifier for the function.
    pub id: &'static str,
    /// Function version (e.g., "v1", "v2").
    pub version: &'static str,
    /// URL path the function is mounted at.
    pub path: &'static str,
    /// Optional description of the function.
    pub description: &'static str,
}

impl FunctionManifest {
    /// Create a new function manifest.
    pub const fn new(id: &'static str, version: &'static str, path: &'static str) -> Self {
        Self {
            id,
            version,
            path,
            description: "",
        }
    }

    /// Create a manifest with description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: FunctionManifest =
        FunctionManifest::new("test-fn", "v1", "/api/test").with_description("test relay");

    #[test]
    fn test_manifest_creation() {
        assert_eq!(MANIFEST.id, "test-fn");
        assert_eq!(MANIFEST.version, "v1");
        assert_eq!(MANIFEST.path, "/api/test");
        assert_eq!(MANIFEST.description, "test relay");
    }

    #[test]
    fn test_manifest_serialization() {
        let json = serde_json::to_string(&MANIFEST).unwrap();
        assert!(json.contains(r#""id":"test-fn""#));
        assert!(json.contains(r#""path":"/api/test""#));
    }
}
