//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, addr) in [
        ("listener.external_bind", &config.listener.external_bind),
        ("listener.internal_bind", &config.listener.internal_bind),
    ] {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(field, format!("invalid socket address {addr:?}")));
        }
    }

    if config.listener.external_bind == config.listener.internal_bind {
        errors.push(ValidationError::new(
            "listener.internal_bind",
            "must differ from listener.external_bind",
        ));
    }

    if config.routing.routes_file.as_os_str().is_empty() {
        errors.push(ValidationError::new("routing.routes_file", "must not be empty"));
    }

    let domain = &config.routing.primary_domain;
    if domain.is_empty() || domain.starts_with('.') || !domain.is_ascii() {
        errors.push(ValidationError::new(
            "routing.primary_domain",
            format!("invalid domain {domain:?}"),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.admin.api_key.as_deref().is_some_and(str::is_empty) {
        errors.push(ValidationError::new("admin.api_key", "must not be empty when set"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
