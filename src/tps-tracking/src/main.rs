//! TPS tracking edge proxy.
//!
//! Accepts page events as query strings and forwards each one to the GA4
//! Measurement Protocol.

use std::sync::Arc;

use clap::Parser;
use tps_core::config::AppConfig;
use tps_edge_proxy::{HttpUpstream, ProxyServer};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "tps-tracking")]
#[command(about = "Stateless edge proxy for GA4 Measurement Protocol events")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long, env = "TPS_PROXY__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "TPS_PROXY__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// GA4 measurement id
    #[arg(long, env = "GA4_MEASUREMENT_ID")]
    measurement_id: Option<String>,

    /// GA4 Measurement Protocol API secret
    #[arg(long, env = "GA4_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// Disable the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tps_tracking=info,tps_edge_proxy=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("TPS tracking proxy starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(id) = cli.measurement_id {
        config.measurement.measurement_id = id;
    }
    if let Some(secret) = cli.api_secret {
        config.measurement.api_secret = secret;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        measurement_id = %config.measurement.measurement_id,
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    let upstream = Arc::new(HttpUpstream::new()?);
    let server = ProxyServer::new(config, upstream);

    if let Err(e) = server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("TPS tracking proxy is ready to serve traffic");

    server.start_http().await?;

    Ok(())
}
