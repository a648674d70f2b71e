//! Salesboard API Server binary
//!
//! HTTP API that builds sales dashboards from files on the server.

use clap::Parser;
use royalbit_salesboard::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "salesboard-server")]
#[command(version)]
#[command(about = "Salesboard API Server - sales dashboards over HTTP")]
#[command(long_about = r#"
Salesboard API Server

Provides RESTful endpoints over the dashboard pipeline. Each one takes a
multipart upload: a `file` part and an optional `filters` JSON part.
  - POST /api/v1/columns   - Detected columns and filter choices
  - POST /api/v1/dashboard - KPIs and chart data for the current filters
  - POST /api/v1/export    - Filtered rows as Filtered_Data.csv

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  salesboard-server                           # Start on localhost:8080
  salesboard-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/dashboard \
    -F file=@sales.csv \
    -F 'filters={"regions": ["East"]}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SALESBOARD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SALESBOARD_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
