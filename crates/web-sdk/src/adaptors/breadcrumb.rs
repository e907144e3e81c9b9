//! Breadcrumb adaptor for the error-reporting collaborator.

use serde::Serialize;
use serde_json::Value;
use tps_core::{CanonicalEvent, TrackingResult};

pub const BREADCRUMB_CATEGORY: &str = "tps.event";
pub const BREADCRUMB_LEVEL: &str = "info";

/// Structured annotation attached to the error-reporting context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    pub category: &'static str,
    pub level: &'static str,
    pub message: String,
    pub data: Value,
}

impl Breadcrumb {
    pub fn for_event(event: &CanonicalEvent) -> Self {
        Self {
            category: BREADCRUMB_CATEGORY,
            level: BREADCRUMB_LEVEL,
            message: event.name().to_string(),
            data: event.payload(),
        }
    }
}

/// Error-reporting hub accepting breadcrumbs. Optional and never
/// load-bearing: failures are discarded by the dispatcher.
pub trait BreadcrumbHub: Send + Sync {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) -> TrackingResult<()>;
}
