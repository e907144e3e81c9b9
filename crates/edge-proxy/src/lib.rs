#![warn(clippy::unwrap_used)]

//! Stateless edge proxy forwarding page events to the GA4 Measurement
//! Protocol.
//!
//! One request in, one upstream `POST` out, one minimal acknowledgement
//! back. The caller never sees the upstream body or status: a forward that
//! the upstream rejects still answers `{"status":"ok"}`. Only local failures
//! (missing credentials, transport errors) produce a `500`.

pub mod handler;
pub mod payload;
pub mod request;
pub mod server;
pub mod upstream;

pub use handler::{handle, ProxyOutcome, ProxyState};
pub use payload::{EventParams, UpstreamEvent, UpstreamPayload};
pub use request::ProxyRequest;
pub use server::ProxyServer;
pub use upstream::{collect_url, HttpUpstream, MeasurementUpstream};
