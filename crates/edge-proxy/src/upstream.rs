//! Outbound call to the measurement-collection endpoint.

use async_trait::async_trait;
use tps_core::config::MeasurementConfig;
use tps_core::{TrackingError, TrackingResult};
use tracing::debug;
use url::Url;

use crate::payload::UpstreamPayload;

/// Sends one payload upstream and reports the HTTP status it got back.
/// Only transport-level failures are errors; any status is a success here.
#[async_trait]
pub trait MeasurementUpstream: Send + Sync {
    async fn send(&self, url: &Url, payload: &UpstreamPayload) -> TrackingResult<u16>;
}

/// Collection URL with the measurement id and API secret in its query.
pub fn collect_url(config: &MeasurementConfig) -> TrackingResult<Url> {
    if config.measurement_id.is_empty() {
        return Err(TrackingError::MissingCredentials("measurement_id"));
    }
    if config.api_secret.is_empty() {
        return Err(TrackingError::MissingCredentials("api_secret"));
    }
    Ok(Url::parse_with_params(
        &config.endpoint,
        &[
            ("measurement_id", config.measurement_id.as_str()),
            ("api_secret", config.api_secret.as_str()),
        ],
    )?)
}

/// `reqwest` client. No request timeout: a hung upstream holds the request
/// until the platform's own timeout.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new() -> TrackingResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TrackingError::Upstream(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MeasurementUpstream for HttpUpstream {
    async fn send(&self, url: &Url, payload: &UpstreamPayload) -> TrackingResult<u16> {
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| TrackingError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, event = payload.event_name(), "measurement upstream answered");
        Ok(status)
    }
}
