//! Administrative channel.
//!
//! Served on the internal listener only. Every route goes through the
//! bearer check in `auth.rs` when an API key is configured.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use crate::http::server::AppState;
use self::auth::admin_auth_middleware;
use self::handlers::*;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register_route))
        .route("/unregister", post(unregister_route))
        .route("/routes", get(list_routes))
        .route("/status", get(get_status))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
