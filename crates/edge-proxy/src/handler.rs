//! Request handling: parse, translate, forward, acknowledge.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tps_core::config::MeasurementConfig;
use tps_core::TrackingResult;
use tracing::{info, warn};
use uuid::Uuid;

use crate::payload::UpstreamPayload;
use crate::request::ProxyRequest;
use crate::upstream::{collect_url, MeasurementUpstream};

/// Shared, read-only state for the handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub measurement: Arc<MeasurementConfig>,
    pub upstream: Arc<dyn MeasurementUpstream>,
    pub start_time: Instant,
}

/// Result of one forward attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// The upstream call was made. `upstream_status` is kept for logs and
    /// metrics only and never reaches the caller.
    Forwarded {
        event: String,
        upstream_status: u16,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ForwardAck {
    pub status: &'static str,
    pub forwarded_event: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ProxyOutcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyOutcome::Forwarded { .. } => StatusCode::OK,
            ProxyOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ProxyOutcome::Forwarded { event, .. } => (
                status,
                Json(ForwardAck {
                    status: "ok",
                    forwarded_event: event,
                }),
            )
                .into_response(),
            ProxyOutcome::Failed { error } => {
                (status, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

/// Forward one event request. Never fails: local errors become
/// [`ProxyOutcome::Failed`].
pub async fn handle(
    query: Option<&str>,
    config: &MeasurementConfig,
    upstream: &dyn MeasurementUpstream,
) -> ProxyOutcome {
    match forward(query.unwrap_or_default(), config, upstream).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "event forward failed");
            metrics::counter!("proxy.errors").increment(1);
            ProxyOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

async fn forward(
    query: &str,
    config: &MeasurementConfig,
    upstream: &dyn MeasurementUpstream,
) -> TrackingResult<ProxyOutcome> {
    let request = ProxyRequest::from_query(query);
    let url = collect_url(config)?;

    // No visitor identity survives between requests.
    let client_id = Uuid::new_v4().to_string();
    let payload = UpstreamPayload::from_request(&request, client_id);

    let upstream_status = upstream.send(&url, &payload).await?;

    metrics::counter!(
        "proxy.forwarded",
        "upstream_status" => upstream_status.to_string()
    )
    .increment(1);
    if (200..300).contains(&upstream_status) {
        info!(event = %request.event, upstream_status, "event forwarded");
    } else {
        warn!(event = %request.event, upstream_status, "upstream rejected forwarded event");
    }

    Ok(ProxyOutcome::Forwarded {
        event: request.event,
        upstream_status,
    })
}

/// Fallback route: every non-operational request is an event forward.
pub async fn forward_event(
    State(state): State<ProxyState>,
    RawQuery(query): RawQuery,
) -> ProxyOutcome {
    handle(
        query.as_deref(),
        &state.measurement,
        state.upstream.as_ref(),
    )
    .await
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health_check(State(state): State<ProxyState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Render a caught panic as the usual JSON error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let error = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "internal error".to_string()
    };
    metrics::counter!("proxy.errors").increment(1);
    ProxyOutcome::Failed { error }.into_response()
}
