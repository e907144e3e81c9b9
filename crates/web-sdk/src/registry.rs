//! Capability registry: which backends are present right now.
//!
//! Each backend's loader registers its entry point once the SDK has loaded.
//! A backend without an entry is absent.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::adaptors::breadcrumb::BreadcrumbHub;
use crate::adaptors::{Backend, EntryPoint};

#[derive(Default)]
pub struct CapabilityRegistry {
    entry_points: HashMap<Backend, Arc<dyn EntryPoint>>,
    breadcrumbs: Option<Arc<dyn BreadcrumbHub>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a backend as present. Replaces any previous entry point.
    pub fn register(&mut self, backend: Backend, entry_point: Arc<dyn EntryPoint>) {
        let replaced = self.entry_points.insert(backend, entry_point).is_some();
        info!(backend = %backend, global = backend.global_name(), replaced, "backend entry point registered");
    }

    pub fn entry_point(&self, backend: Backend) -> Option<Arc<dyn EntryPoint>> {
        self.entry_points.get(&backend).cloned()
    }

    pub fn register_breadcrumbs(&mut self, hub: Arc<dyn BreadcrumbHub>) {
        info!("breadcrumb hub registered");
        self.breadcrumbs = Some(hub);
    }

    pub fn breadcrumbs(&self) -> Option<Arc<dyn BreadcrumbHub>> {
        self.breadcrumbs.clone()
    }
}
