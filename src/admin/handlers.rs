use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::http::server::AppState;
use crate::routing::store::StoredRoutes;

/// Body of `/register` and `/unregister`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub host: String,
    pub method: String,
    pub path: String,
    pub endpoint: String,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

pub async fn register_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Response {
    // Registration persists to disk; keep it off the async workers.
    let table = state.table.clone();
    let result = tokio::task::spawn_blocking(move || {
        table.register(&req.host, &req.method, &req.path, &req.endpoint)
    })
    .await;

    match result {
        Ok(Ok(())) => Json(serde_json::json!({ "status": "registered" })).into_response(),
        Ok(Err(e)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Registration task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn unregister_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Response {
    let table = state.table.clone();
    let result = tokio::task::spawn_blocking(move || {
        table.unregister(&req.host, &req.method, &req.path, &req.endpoint)
    })
    .await;

    match result {
        Ok(removed) => Json(serde_json::json!({ "status": "unregistered", "removed": removed })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Unregistration task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn list_routes(State(state): State<AppState>) -> Json<StoredRoutes> {
    Json(state.table.routes())
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.table.snapshot().rule_count(),
    })
}
