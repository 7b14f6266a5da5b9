//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, host, path)
//!     → table.rs (load current Dispatcher snapshot)
//!     → dispatcher.rs (method group → host + path rules)
//!     → matcher.rs / pattern.rs (evaluate, capture params)
//!     → Return: Resolution or NoMatch
//!
//! Registration (admin channel):
//!     register / unregister
//!     → pattern.rs (compile template)
//!     → table.rs (mutate, rebuild Dispatcher, swap)
//!     → store.rs (persist templates)
//! ```
//!
//! # Design Decisions
//! - Dispatcher is immutable; mutations publish a new one
//! - Only templates are persisted, patterns are recompiled on load
//! - Deterministic: first registered matching route wins

pub mod dispatcher;
pub mod matcher;
pub mod pattern;
pub mod store;
pub mod table;

pub use dispatcher::{Dispatcher, Resolution};
pub use matcher::RequestTarget;
pub use pattern::{Params, PathPattern, PatternError};
pub use store::{RouteStore, StoreError};
pub use table::{Route, RouteError, RouteTable};
