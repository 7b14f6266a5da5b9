use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the tenant gateway", long_about = None)]
struct Cli {
    /// Base URL of the internal (admin) listener.
    #[arg(short, long, default_value = "http://localhost:8889")]
    url: String,

    /// Bearer token, if the gateway has `admin.api_key` set.
    #[arg(short, long, env = "GATEWAY_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RouteArgs {
    /// Tenant host (e.g. foo.asyncyapp.com)
    host: String,
    /// HTTP method
    method: String,
    /// Path template (e.g. /users/:id)
    path: String,
    /// Endpoint identifier
    endpoint: String,
}

impl RouteArgs {
    fn to_json(&self) -> Value {
        json!({
            "host": self.host,
            "method": self.method,
            "path": self.path,
            "endpoint": self.endpoint,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List registered routes
    Routes,
    /// Register a route
    Register(RouteArgs),
    /// Unregister a route
    Unregister(RouteArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let res = match &cli.command {
        Commands::Status => {
            client.get(format!("{}/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Routes => {
            client.get(format!("{}/routes", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Register(route) => {
            client.post(format!("{}/register", cli.url))
                .headers(headers)
                .json(&route.to_json())
                .send()
                .await?
        }
        Commands::Unregister(route) => {
            client.post(format!("{}/unregister", cli.url))
                .headers(headers)
                .json(&route.to_json())
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
