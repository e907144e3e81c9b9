//! HTTP server wrapping the forward handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tps_core::config::AppConfig;
use tracing::{info, warn};

use crate::handler::{self, ProxyState};
use crate::upstream::MeasurementUpstream;

/// Build the proxy router. Operational routes are matched first; every
/// other path and method forwards an event.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(handler::health_check))
        .route("/live", get(handler::liveness))
        .fallback(handler::forward_event)
        .layer(CatchPanicLayer::custom(handler::panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ProxyServer {
    config: AppConfig,
    upstream: Arc<dyn MeasurementUpstream>,
}

impl ProxyServer {
    pub fn new(config: AppConfig, upstream: Arc<dyn MeasurementUpstream>) -> Self {
        Self { config, upstream }
    }

    pub fn state(&self) -> ProxyState {
        ProxyState {
            measurement: Arc::new(self.config.measurement.clone()),
            upstream: self.upstream.clone(),
            start_time: Instant::now(),
        }
    }

    /// Start the HTTP server. Blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        if !self.config.measurement.has_credentials() {
            warn!("measurement credentials missing, every forward will fail");
        }

        let app = router(self.state());
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, endpoint = %self.config.measurement.endpoint, "Starting proxy HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on its own port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
