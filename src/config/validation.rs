//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, redirect cap >= 1)
//! - Validate URLs, the mount prefix and the bind address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("relay.prefix `{0}` must start and end with '/'")]
    Prefix(String),

    #[error("{field} `{value}` is not an absolute http(s) URL")]
    Url { field: &'static str, value: String },

    #[error("relay.max_redirects must be at least 1")]
    MaxRedirects,

    #[error("relay.public_scheme `{0}` must be http or https")]
    PublicScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.log_format `{0}` must be pretty or json")]
    LogFormat(String),
}

/// Check every semantic constraint and collect all failures.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let relay = &config.relay;
    if !relay.prefix.starts_with('/') || !relay.prefix.ends_with('/') {
        errors.push(ValidationError::Prefix(relay.prefix.clone()));
    }
    for (field, value) in [
        ("relay.asset_url", &relay.asset_url),
        ("relay.mirror_base", &relay.mirror_base),
    ] {
        if !is_http_url(value) {
            errors.push(ValidationError::Url {
                field,
                value: value.clone(),
            });
        }
    }
    if relay.max_redirects == 0 {
        errors.push(ValidationError::MaxRedirects);
    }
    if !matches!(relay.public_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::PublicScheme(relay.public_scheme.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::LogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
