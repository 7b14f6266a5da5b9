//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! External listener (tenant traffic)
//!     → server.rs (Axum setup, request ID, timeout)
//!     → request.rs (host without port, request ID)
//!     → routing::RouteTable::resolve
//!     → 200 + resolution JSON, or 404
//!
//! Internal listener (admin channel)
//!     → admin/ (register, unregister, listing)
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
