//! Proxy round-trips against an in-process upstream.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;
use tps_core::config::MeasurementConfig;
use tps_core::{TrackingError, TrackingResult};
use tps_edge_proxy::server::router;
use tps_edge_proxy::{handle, MeasurementUpstream, ProxyOutcome, ProxyState, UpstreamPayload};
use url::Url;

/// Upstream double answering with a fixed status, or failing at transport
/// level when `status` is `None`.
struct FakeUpstream {
    status: Option<u16>,
    sent: Mutex<Vec<(Url, UpstreamPayload)>>,
}

impl FakeUpstream {
    fn answering(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status: Some(status),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            status: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.sent.lock().len()
    }

    fn last_body(&self) -> Value {
        let sent = self.sent.lock();
        let (_, payload) = sent.last().expect("no upstream call recorded");
        serde_json::to_value(payload).expect("payload serializes")
    }
}

#[async_trait]
impl MeasurementUpstream for FakeUpstream {
    async fn send(&self, url: &Url, payload: &UpstreamPayload) -> TrackingResult<u16> {
        self.sent.lock().push((url.clone(), payload.clone()));
        self.status
            .ok_or_else(|| TrackingError::Upstream("connection reset by peer".into()))
    }
}

fn measurement() -> MeasurementConfig {
    MeasurementConfig {
        measurement_id: "G-TPS".into(),
        api_secret: "secret".into(),
        ..MeasurementConfig::default()
    }
}

const PURCHASE: &str =
    "event=purchase&value=42.5&currency=USD&transaction_id=T1&items=%5B%7B%22id%22%3A%22p1%22%7D%5D";

#[tokio::test]
async fn test_purchase_round_trip() {
    let upstream = FakeUpstream::answering(204);
    let outcome = handle(Some(PURCHASE), &measurement(), upstream.as_ref()).await;

    assert_eq!(
        outcome,
        ProxyOutcome::Forwarded {
            event: "purchase".into(),
            upstream_status: 204,
        }
    );

    let body = upstream.last_body();
    let events = body["events"].as_array().expect("events array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "purchase");
    assert_eq!(events[0]["params"]["value"], 42.5);
    assert_eq!(events[0]["params"]["currency"], "USD");
    assert_eq!(events[0]["params"]["transaction_id"], "T1");
    assert_eq!(events[0]["params"]["items"], json!([{ "id": "p1" }]));
    assert!(!body["client_id"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_upstream_rejection_still_reports_ok() {
    for status in [400, 403, 500, 503] {
        let upstream = FakeUpstream::answering(status);
        let outcome = handle(Some(PURCHASE), &measurement(), upstream.as_ref()).await;
        assert_eq!(outcome.status_code(), StatusCode::OK);
        assert!(matches!(
            outcome,
            ProxyOutcome::Forwarded { ref event, upstream_status } if event == "purchase" && upstream_status == status
        ));
    }
}

#[tokio::test]
async fn test_malformed_items_are_dropped() {
    let upstream = FakeUpstream::answering(200);
    let outcome = handle(
        Some("event=view_item&items=not-json"),
        &measurement(),
        upstream.as_ref(),
    )
    .await;

    assert_eq!(outcome.status_code(), StatusCode::OK);
    let params = &upstream.last_body()["events"][0]["params"];
    assert!(params.get("items").is_none());
}

#[tokio::test]
async fn test_missing_event_defaults_to_page_view() {
    let upstream = FakeUpstream::answering(200);
    let outcome = handle(
        Some("location=https%3A%2F%2Fshop.example%2F&title=Home"),
        &measurement(),
        upstream.as_ref(),
    )
    .await;

    assert!(matches!(outcome, ProxyOutcome::Forwarded { ref event, .. } if event == "page_view"));
    let body = upstream.last_body();
    assert_eq!(body["events"][0]["name"], "page_view");
    assert_eq!(
        body["events"][0]["params"],
        json!({ "page_location": "https://shop.example/", "page_title": "Home" })
    );
}

#[tokio::test]
async fn test_no_query_at_all() {
    let upstream = FakeUpstream::answering(200);
    let outcome = handle(None, &measurement(), upstream.as_ref()).await;
    assert!(matches!(outcome, ProxyOutcome::Forwarded { ref event, .. } if event == "page_view"));
}

#[tokio::test]
async fn test_non_numeric_value_is_omitted() {
    let upstream = FakeUpstream::answering(200);
    handle(
        Some("event=add_to_cart&value=twelve&currency=EUR"),
        &measurement(),
        upstream.as_ref(),
    )
    .await;

    let params = &upstream.last_body()["events"][0]["params"];
    assert!(params.get("value").is_none());
    assert_eq!(params["currency"], "EUR");
}

#[tokio::test]
async fn test_credentials_travel_in_the_url() {
    let upstream = FakeUpstream::answering(200);
    handle(Some("event=page_view"), &measurement(), upstream.as_ref()).await;

    let sent = upstream.sent.lock();
    let url = &sent[0].0;
    assert_eq!(url.path(), "/mp/collect");
    assert!(url.query_pairs().any(|(k, v)| k == "measurement_id" && v == "G-TPS"));
    assert!(url.query_pairs().any(|(k, v)| k == "api_secret" && v == "secret"));
}

#[tokio::test]
async fn test_client_id_is_fresh_per_request() {
    let upstream = FakeUpstream::answering(200);
    handle(Some("event=a"), &measurement(), upstream.as_ref()).await;
    handle(Some("event=b"), &measurement(), upstream.as_ref()).await;

    let sent = upstream.sent.lock();
    assert_ne!(sent[0].1.client_id, sent[1].1.client_id);
}

#[tokio::test]
async fn test_transport_failure_is_a_structured_error() {
    let upstream = FakeUpstream::unreachable();
    let outcome = handle(Some(PURCHASE), &measurement(), upstream.as_ref()).await;

    assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    match outcome {
        ProxyOutcome::Failed { error } => assert!(error.contains("connection reset")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credentials_fail_without_calling_upstream() {
    let upstream = FakeUpstream::answering(200);
    let outcome = handle(Some(PURCHASE), &MeasurementConfig::default(), upstream.as_ref()).await;

    assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(upstream.calls(), 0);
}

// ─── HTTP surface ───────────────────────────────────────────────────────────

/// Upstream whose client code blows up mid-request.
struct PanickingUpstream;

#[async_trait]
impl MeasurementUpstream for PanickingUpstream {
    async fn send(&self, _url: &Url, _payload: &UpstreamPayload) -> TrackingResult<u16> {
        panic!("upstream client exploded")
    }
}

fn app(upstream: Arc<dyn MeasurementUpstream>) -> axum::Router {
    router(ProxyState {
        measurement: Arc::new(measurement()),
        upstream,
        start_time: Instant::now(),
    })
}

async fn send(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn test_http_forward_acknowledges_without_upstream_body() {
    let upstream = FakeUpstream::answering(500);
    let (status, body) = send(app(upstream.clone()), &format!("/?{PURCHASE}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "forwarded_event": "purchase" }));
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_http_any_path_forwards() {
    let upstream = FakeUpstream::answering(200);
    let (status, body) = send(app(upstream.clone()), "/collect?event=add_to_cart").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forwarded_event"], "add_to_cart");
}

#[tokio::test]
async fn test_http_upstream_failure_is_500_json() {
    let (status, body) = send(app(FakeUpstream::unreachable()), "/?event=purchase").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("connection reset"));
}

#[tokio::test]
async fn test_http_health_is_not_forwarded() {
    let upstream = FakeUpstream::answering(200);
    let (status, body) = send(app(upstream.clone()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_http_panic_is_caught_as_500_json() {
    let (status, body) = send(app(Arc::new(PanickingUpstream)), "/?event=purchase").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "upstream client exploded" }));
}
