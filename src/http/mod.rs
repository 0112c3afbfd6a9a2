//! HTTP types for relay functions providing a fetch-like API.

mod request;
mod response;

pub use request::{Method, RelayRequest};
pub use response::{ErrorBody, RelayResponse, StatusCode};
