//! Relay runtime: configuration and the HTTP server hosting the functions.

mod config;
mod server;

pub use config::{parse_host_list, RuntimeConfig};
pub use server::RelayServer;
