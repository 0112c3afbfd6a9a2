//! Runtime configuration.

use serde::{Deserialize, Serialize};

pub const HOST_ENV: &str = "RELAYFN_HOST";
pub const PORT_ENV: &str = "RELAYFN_PORT";
pub const MAX_BODY_SIZE_ENV: &str = "RELAYFN_MAX_BODY_SIZE";
pub const ALLOWED_HOSTS_ENV: &str = "IMAGE_PROXY_ALLOWED_HOSTS";

/// Configuration for the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable the `/_metrics` endpoint.
    pub enable_metrics: bool,
    /// Whether to enable the `/_health` endpoint.
    pub enable_health: bool,
    /// Maximum inbound request body size in bytes.
    pub max_body_size: usize,
    /// Hosts the image relay may fetch from. Empty means any host.
    pub image_allowed_hosts: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_metrics: true,
            enable_health: true,
            max_body_size: 1024 * 1024, // 1MB
            image_allowed_hosts: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `RELAYFN_HOST`, `RELAYFN_PORT`,
    /// `RELAYFN_MAX_BODY_SIZE` and `IMAGE_PROXY_ALLOWED_HOSTS`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            config.port = port
                .parse()
                .map_err(|e| format!("invalid {} '{}': {}", PORT_ENV, port, e))?;
        }
        if let Some(size) = lookup(MAX_BODY_SIZE_ENV) {
            config.max_body_size = size
                .parse()
                .map_err(|e| format!("invalid {} '{}': {}", MAX_BODY_SIZE_ENV, size, e))?;
        }
        if let Some(hosts) = lookup(ALLOWED_HOSTS_ENV) {
            config.image_allowed_hosts = parse_host_list(&hosts);
        }

        Ok(config)
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum inbound body size.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Restrict the image relay to the given hosts.
    pub fn image_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated host list, dropping blanks.
pub fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}
