//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (route added/removed, dispatch, persistence)
//!     → logging.rs (subscriber, filtering, formatting)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//! ```

pub mod logging;
