//! Booking platform API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ CORS / request ID / trace / timeout / body limit
//!                         │
//!                         ▼
//!                   internal filter ──▶ 403 for /…/internal/…
//!                         │
//!                         ▼
//!                       span
//!                         │
//!                         ▼
//!                 ┌──────────────┐     ┌──────────────┐
//!                 │  route table │────▶│ authenticator│──▶ 401 / 403
//!                 └──────┬───────┘     └──────┬───────┘
//!                        │ 404                │
//!                        ▼                    ▼
//!                 ┌──────────────┐     ┌──────────────┐
//!                 │    proxy     │     │  RPC client  │
//!                 │ (HTTP svc)   │     │ (TCP, JSON)  │
//!                 └──────────────┘     └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use booking_gateway::config::load_config;
use booking_gateway::lifecycle::{self, signals, Shutdown};
use booking_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "booking-gateway")]
#[command(about = "API gateway for the booking platform", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("booking-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        rpc_timeout_ms = config.rpc.call_timeout_ms,
        extra_routes = config.routes.len(),
        "Configuration loaded"
    );
    for service in booking_gateway::config::ServiceName::ALL {
        tracing::info!(service = %service, url = %config.services.url(service), "Upstream service");
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    lifecycle::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
