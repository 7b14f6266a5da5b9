//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → read once at startup by main.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route changes go through the
//!   administrative channel, not the config file
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::RoutingConfig;
pub use schema::{AdminConfig, ObservabilityConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
