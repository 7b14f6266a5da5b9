//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (external and internal bind addresses).
    pub listener: ListenerConfig,

    /// Route table settings.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Administrative channel settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address serving tenant traffic (e.g., "0.0.0.0:8888").
    pub external_bind: String,

    /// Address serving register/unregister calls.
    pub internal_bind: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            external_bind: "0.0.0.0:8888".to_string(),
            internal_bind: "0.0.0.0:8889".to_string(),
        }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// File the route templates are persisted to.
    pub routes_file: PathBuf,

    /// Platform domain shared by all tenants (e.g., "storyscriptapp.com").
    pub primary_domain: String,
}

impl RoutingConfig {
    /// Length of the primary domain, without the separating dot.
    pub fn primary_domain_len(&self) -> usize {
        self.primary_domain.len()
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::from(".routes.json"),
            primary_domain: "storyscriptapp.com".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Administrative channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on the internal listener. No auth when unset.
    pub api_key: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
