//! Multi-tenant HTTP gateway (v0.2)
//!
//! Resolves tenant requests to registered endpoints and accepts route
//! registrations on a separate internal listener.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                     GATEWAY                      │
//!                     │                                                  │
//!   Tenant Request    │  ┌──────────┐    ┌────────────┐   ┌───────────┐  │
//!   ──────────────────┼─▶│ external │───▶│ RouteTable │──▶│Dispatcher │  │
//!   (method,host,path)│  │ listener │    │  resolve   │   │ snapshot  │  │
//!                     │  └──────────┘    └────────────┘   └─────▲─────┘  │
//!                     │                                         │ swap   │
//!   Admin Request     │  ┌──────────┐    ┌────────────┐   ┌─────┴─────┐  │
//!   ──────────────────┼─▶│ internal │───▶│  register  │──▶│  rebuild  │  │
//!   (register/unreg.) │  │ listener │    │ unregister │   │ + persist │  │
//!                     │  └──────────┘    └────────────┘   └───────────┘  │
//!                     └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use tenant_gateway::config::{self, GatewayConfig};
use tenant_gateway::lifecycle::{signals, Shutdown};
use tenant_gateway::observability::logging;
use tenant_gateway::routing::{RouteStore, RouteTable};
use tenant_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Multi-tenant HTTP gateway", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `routing.routes_file`.
    #[arg(long, env = "ROUTES_FILE")]
    routes_file: Option<PathBuf>,

    /// Overrides `routing.primary_domain`.
    #[arg(long, env = "PRIMARY_DOMAIN")]
    primary_domain: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(routes_file) = args.routes_file {
        config.routing.routes_file = routes_file;
    }
    if let Some(primary_domain) = args.primary_domain {
        config.routing.primary_domain = primary_domain;
    }
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!("tenant-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        external_bind = %config.listener.external_bind,
        internal_bind = %config.listener.internal_bind,
        routes_file = %config.routing.routes_file.display(),
        primary_domain = %config.routing.primary_domain,
        "Configuration loaded"
    );

    // Routes must be restored before any traffic is accepted.
    let table = Arc::new(RouteTable::open(
        RouteStore::new(config.routing.routes_file.clone()),
        config.routing.primary_domain_len(),
    ));

    let external = TcpListener::bind(&config.listener.external_bind).await?;
    let internal = TcpListener::bind(&config.listener.internal_bind).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = GatewayServer::new(config, table);
    server.run(external, internal, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
