//! Per-backend pending queues for events captured while a backend is absent.

use std::collections::BTreeMap;
use std::sync::Arc;

use tps_core::CanonicalEvent;

use crate::adaptors::Backend;

/// Append-only until drained. Draining hands back every event in insertion
/// order and leaves the queue empty; events are never re-queued.
#[derive(Debug, Default)]
pub struct PendingQueues {
    queues: BTreeMap<Backend, Vec<Arc<CanonicalEvent>>>,
}

impl PendingQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, backend: Backend, event: Arc<CanonicalEvent>) {
        self.queues.entry(backend).or_default().push(event);
    }

    pub fn len(&self, backend: Backend) -> usize {
        self.queues.get(&backend).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, backend: Backend) -> bool {
        self.len(backend) == 0
    }

    pub fn total(&self) -> usize {
        self.queues.values().map(Vec::len).sum()
    }

    /// Backends holding at least one event, in fan-out order.
    pub fn pending_backends(&self) -> Vec<Backend> {
        self.queues
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(backend, _)| *backend)
            .collect()
    }

    pub fn drain(&mut self, backend: Backend) -> Vec<Arc<CanonicalEvent>> {
        self.queues
            .get_mut(&backend)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tps_core::Attributes;

    fn event(name: &str) -> Arc<CanonicalEvent> {
        Arc::new(CanonicalEvent::new(name, 0, Attributes::new()).unwrap())
    }

    #[test]
    fn test_drain_preserves_order_and_clears() {
        let mut queues = PendingQueues::new();
        queues.enqueue(Backend::Ga4, event("a"));
        queues.enqueue(Backend::Ga4, event("b"));
        queues.enqueue(Backend::Ga4, event("c"));
        assert_eq!(queues.len(Backend::Ga4), 3);

        let drained: Vec<String> = queues
            .drain(Backend::Ga4)
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(drained, vec!["a", "b", "c"]);
        assert!(queues.is_empty(Backend::Ga4));
        assert!(queues.drain(Backend::Ga4).is_empty());
    }

    #[test]
    fn test_queues_are_independent() {
        let mut queues = PendingQueues::new();
        let shared = event("Page View");
        queues.enqueue(Backend::Ga4, shared.clone());
        queues.enqueue(Backend::MetaPixel, shared);

        assert_eq!(queues.total(), 2);
        assert_eq!(
            queues.pending_backends(),
            vec![Backend::Ga4, Backend::MetaPixel]
        );

        queues.drain(Backend::Ga4);
        assert_eq!(queues.pending_backends(), vec![Backend::MetaPixel]);
        assert_eq!(queues.drain(Backend::MetaPixel)[0].name(), "Page View");
    }
}
