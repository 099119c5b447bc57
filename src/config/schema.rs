//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Classification, rewriting and access settings.
    pub relay: RelaySettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Relay behaviour: where unmatched paths go, how targets are embedded,
/// and which targets are allowed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Origin serving the static front page and assets for unmatched paths.
    pub asset_url: String,

    /// Path prefix the relay is mounted under. Starts and ends with `/`.
    pub prefix: String,

    /// Redirect blob and raw-content requests to the CDN mirror instead of
    /// proxying them.
    pub mirror_mode: bool,

    /// Base URL of the CDN mirror (`<base>/owner/repo@ref/path`).
    pub mirror_base: String,

    /// Substring allow-list for embedded targets. Empty allows everything.
    pub allow_list: Vec<String>,

    /// Maximum number of redirects the relay follows on its own per request.
    pub max_redirects: usize,

    /// Scheme used when building the `?q=` shortcut redirect.
    pub public_scheme: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            asset_url: "https://kiko923.github.io/ghweb/".to_string(),
            prefix: "/".to_string(),
            mirror_mode: false,
            mirror_base: "https://cdn.jsdelivr.net/gh".to_string(),
            allow_list: Vec::new(),
            max_redirects: 10,
            public_scheme: "https".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed to produce response headers, in seconds.
    /// Streaming the body afterwards is not bounded.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
