//! CGI/FastCGI HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!                 │                 CGI GATEWAY                   │
//!                 │                                               │
//!  Client ───────▶│  http/server ──▶ gateway/dispatch             │
//!                 │                     │                         │
//!                 │        ┌────────────┼─────────────┐           │
//!                 │        ▼            ▼             ▼           │
//!                 │  static_files    exec (local    transport ────┼──▶ FastCGI
//!                 │  (ServeFile)     interpreter)                 │    backend
//!                 │        │            │             │           │
//!                 │        │      gateway/response ◀──┘           │
//!                 │        │      (CGI payload → HTTP)            │
//!  Client ◀───────┼────────┴────────────┴                         │
//!                 └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tokio::net::TcpListener;

use cgi_gateway::config::{self, GatewayConfig};
use cgi_gateway::http::HttpServer;
use cgi_gateway::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First CLI argument is a config path; defaults apply without one.
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_config(&PathBuf::from(path))?,
        None => GatewayConfig::default(),
    };

    // RUST_LOG still wins; the config directive is the fallback.
    logging::init(&config.observability.log_level);

    tracing::info!("cgi-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        root = %config.dispatch.root.display(),
        mode = ?config.dispatch.mode,
        interpreters = config.dispatch.interpreters.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
