//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tenant_gateway::config::GatewayConfig;
use tenant_gateway::routing::{RouteStore, RouteTable};
use tenant_gateway::{GatewayServer, Shutdown};

pub const TENANT: &str = "foo.asyncyapp.com";
pub const TENANT_HOST: &str = "foo.asyncyapp.com.storyscriptapp.com";

/// A gateway running on ephemeral ports.
pub struct TestGateway {
    pub external: SocketAddr,
    pub internal: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestGateway {
    pub fn external_url(&self, path: &str) -> String {
        format!("http://{}{}", self.external, path)
    }

    pub fn internal_url(&self, path: &str) -> String {
        format!("http://{}{}", self.internal, path)
    }

    /// Trigger shutdown and wait for both listeners to stop.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("gateway did not stop in time")
            .unwrap()
            .unwrap();
    }
}

/// Start a gateway whose routes are persisted under `routes_file`.
pub async fn start_gateway(routes_file: &Path, api_key: Option<&str>) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.routing.routes_file = routes_file.to_path_buf();
    config.admin.api_key = api_key.map(str::to_string);

    let table = Arc::new(RouteTable::open(
        RouteStore::new(routes_file),
        config.routing.primary_domain_len(),
    ));

    let external = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let internal = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let external_addr = external.local_addr().unwrap();
    let internal_addr = internal.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, table);
    let handle = tokio::spawn(server.run(external, internal, shutdown.clone()));

    TestGateway {
        external: external_addr,
        internal: internal_addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn route(host: &str, method: &str, path: &str, endpoint: &str) -> serde_json::Value {
    serde_json::json!({
        "host": host,
        "method": method,
        "path": path,
        "endpoint": endpoint,
    })
}
