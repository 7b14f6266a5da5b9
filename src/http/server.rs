//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the external (tenant traffic) and internal (admin) Axum routers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind both routers to their listeners
//! - Dispatch tenant requests through the route table

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::GatewayConfig;
use crate::http::request::{request_host, request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    /// Bearer token for the internal listener, if auth is enabled.
    pub admin_key: Option<Arc<str>>,
}

/// HTTP front of the gateway.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server around an already restored route table.
    pub fn new(config: GatewayConfig, table: Arc<RouteTable>) -> Self {
        let state = AppState {
            table,
            admin_key: config.admin.api_key.as_deref().map(Arc::from),
        };
        Self { config, state }
    }

    /// Router for tenant traffic: every method and path is resolved.
    pub fn external_router(&self) -> Router {
        let router = Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(self.state.clone());
        self.with_layers(router)
    }

    /// Router for the administrative channel.
    pub fn internal_router(&self) -> Router {
        self.with_layers(setup_admin_router(self.state.clone()))
    }

    #[allow(deprecated)]
    fn with_layers(&self, router: Router) -> Router {
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs))),
        )
    }

    /// Serve both listeners until `shutdown` is triggered.
    pub async fn run(
        self,
        external: TcpListener,
        internal: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            external = %external.local_addr()?,
            internal = %internal.local_addr()?,
            routes = self.state.table.len(),
            "HTTP server starting"
        );

        let external = axum::serve(external, self.external_router())
            .with_graceful_shutdown(shutdown.wait());
        let internal = axum::serve(internal, self.internal_router())
            .with_graceful_shutdown(shutdown.wait());

        tokio::try_join!(external.into_future(), internal.into_future())?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves a tenant request to its endpoint.
///
/// Unmatched requests get a uniform 404 that says nothing about which
/// route came close.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request);
    let method = request.method().as_str();
    let path = request.uri().path();

    let resolution = request_host(&request).and_then(|host| state.table.resolve(method, &host, path));

    match resolution {
        Some(resolution) => {
            tracing::debug!(
                request_id = %request_id,
                %method,
                %path,
                endpoint = %resolution.endpoint,
                "Resolved request"
            );
            Json(resolution).into_response()
        }
        None => {
            tracing::debug!(request_id = %request_id, %method, %path, "No route matched");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
