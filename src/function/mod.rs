//! Relay function module: the function trait, its metadata and the registry.

pub mod handler;
pub mod manifest;
pub mod registry;

pub use handler::{FunctionContext, RelayError, RelayFunction};
pub use manifest::FunctionManifest;
pub use registry::FunctionRegistry;
