//! The dispatcher: single path from a semantic event to zero or more backend
//! deliveries.
//!
//! All state lives in one [`Dispatcher`] value owned by the host. Operations
//! run on the host's single logical thread; the delayed flush is a timer
//! queue entry that runs when the host advances time.

use std::sync::Arc;
use std::time::Duration;

use tps_core::{Attributes, CanonicalEvent};
use tracing::{debug, info};

use crate::adaptors::breadcrumb::{Breadcrumb, BreadcrumbHub};
use crate::adaptors::{Backend, EntryPoint};
use crate::best_effort::best_effort;
use crate::config::IntegrationsConfig;
use crate::events::{DomEvent, ListenerPhase, PageContext};
use crate::hooks::{self, AutoHook};
use crate::host::{Clock, LocalStore, MemoryStore, RecordingScriptLoader, ScriptLoader, SystemClock};
use crate::queue::PendingQueues;
use crate::registry::CapabilityRegistry;
use crate::scheduler::TimerQueue;

/// Local storage key enabling the diagnostic mirror.
pub const DEBUG_FLAG_KEY: &str = "TPS_DEBUG";

/// Delay before the second startup flush.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(1500);

const CLARITY_TAG_URL: &str = "https://www.clarity.ms/tag/";

/// Deferred work owned by the dispatcher's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    Flush,
}

/// Outcome of a flush pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Events handed to an entry point (successfully or not).
    pub attempted: usize,
    /// Deliveries whose entry point returned an error.
    pub failed: usize,
    /// Backends whose queue stayed put because they are still absent.
    pub still_absent: Vec<Backend>,
}

pub struct Dispatcher {
    config: IntegrationsConfig,
    registry: CapabilityRegistry,
    queues: PendingQueues,
    timers: TimerQueue<ScheduledTask>,
    hooks: Vec<Box<dyn AutoHook>>,
    initialized: bool,
    flush_delay: Duration,
    store: Box<dyn LocalStore>,
    scripts: Box<dyn ScriptLoader>,
    clock: Box<dyn Clock>,
}

impl Dispatcher {
    pub fn new(config: IntegrationsConfig) -> Self {
        Self {
            config,
            registry: CapabilityRegistry::new(),
            queues: PendingQueues::new(),
            timers: TimerQueue::new(),
            hooks: Vec::new(),
            initialized: false,
            flush_delay: DEFAULT_FLUSH_DELAY,
            store: Box::new(MemoryStore::new()),
            scripts: Box::new(RecordingScriptLoader::new()),
            clock: Box::new(SystemClock),
        }
    }

    /// Build from the raw integrations blob found in the page.
    pub fn from_blob(blob: Option<&str>) -> Self {
        Self::new(IntegrationsConfig::from_blob(blob))
    }

    pub fn with_local_store(mut self, store: impl LocalStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_script_loader(mut self, loader: impl ScriptLoader + 'static) -> Self {
        self.scripts = Box::new(loader);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }

    /// Loaded integrations, read-only.
    pub fn integrations(&self) -> &IntegrationsConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Install auto-hooks, fire the page view, load Clarity and run the
    /// startup flushes. Runs at most once; later calls return `false`.
    pub fn initialize(&mut self, page: &PageContext) -> bool {
        if self.initialized {
            debug!("dispatcher already initialized, skipping");
            return false;
        }
        self.initialized = true;

        self.hooks = hooks::default_hooks();
        let page_view = hooks::page_view(page);
        self.track_event(page_view.name, page_view.attributes);

        self.load_clarity();

        self.flush();
        self.timers
            .schedule_after(self.flush_delay, ScheduledTask::Flush);

        info!(
            backends = ?self.config.enabled_backends(),
            hooks = self.hooks.len(),
            flush_delay_ms = self.flush_delay.as_millis() as u64,
            "dispatcher initialized"
        );
        true
    }

    /// Record an event. An empty name is ignored. Never fails.
    pub fn track_event(&mut self, name: &str, attributes: Attributes) {
        let event = match CanonicalEvent::new(name, self.clock.now_millis(), attributes) {
            Ok(event) => Arc::new(event),
            Err(_) => return,
        };

        if self.debug_mode() {
            info!(target: "tps::debug", payload = %event.payload(), "TPS.trackEvent");
        }

        for backend in self.config.enabled_backends() {
            match self.registry.entry_point(backend) {
                Some(entry_point) => {
                    deliver(backend, entry_point.as_ref(), &event);
                }
                None => {
                    debug!(backend = %backend, event = event.name(), "backend absent, event queued");
                    self.queues.enqueue(backend, event.clone());
                }
            }
        }

        // Breadcrumbs need both a configured DSN and a loaded hub.
        if self.config.sentry_dsn().is_some() {
            if let Some(hub) = self.registry.breadcrumbs() {
                best_effort("breadcrumb", || {
                    hub.add_breadcrumb(Breadcrumb::for_event(&event))
                });
            }
        }
    }

    /// Deliver queued events to every backend that is now present. Each
    /// drained queue is emptied whatever the per-item outcome.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();

        for backend in self.queues.pending_backends() {
            let Some(entry_point) = self.registry.entry_point(backend) else {
                report.still_absent.push(backend);
                continue;
            };

            let events = self.queues.drain(backend);
            for event in &events {
                report.attempted += 1;
                if !deliver(backend, entry_point.as_ref(), event) {
                    report.failed += 1;
                }
            }
            info!(backend = %backend, count = events.len(), "flushed pending events");
        }

        report
    }

    /// Advance the dispatcher's virtual clock and run whatever became due.
    pub fn advance_time(&mut self, by: Duration) {
        for task in self.timers.advance(by) {
            match task {
                ScheduledTask::Flush => {
                    self.flush();
                }
            }
        }
    }

    /// Feed a DOM event to the installed hooks listening in `phase`.
    /// Ignored before initialization.
    pub fn handle_dom_event(&mut self, event: &DomEvent, phase: ListenerPhase) {
        let requests: Vec<_> = self
            .hooks
            .iter()
            .filter(|hook| hook.phase() == phase)
            .filter_map(|hook| {
                let request = hook.observe(event)?;
                debug!(hook = hook.name(), event = request.name, "auto-hook matched");
                Some(request)
            })
            .collect();

        for request in requests {
            self.track_event(request.name, request.attributes);
        }
    }

    /// Record a backend's entry point once its SDK has loaded.
    pub fn register_backend(&mut self, backend: Backend, entry_point: Arc<dyn EntryPoint>) {
        self.registry.register(backend, entry_point);
    }

    pub fn register_breadcrumbs(&mut self, hub: Arc<dyn BreadcrumbHub>) {
        self.registry.register_breadcrumbs(hub);
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn pending(&self, backend: Backend) -> usize {
        self.queues.len(backend)
    }

    pub fn queues(&self) -> &PendingQueues {
        &self.queues
    }

    pub fn scheduled_tasks(&self) -> usize {
        self.timers.pending()
    }

    pub fn debug_mode(&self) -> bool {
        self.store.get(DEBUG_FLAG_KEY).as_deref() == Some("1")
    }

    /// Persist the debug flag in the host's local store.
    pub fn set_debug_mode(&self, enabled: bool) {
        let value = if enabled { "1" } else { "0" };
        best_effort("debug_flag", || self.store.set(DEBUG_FLAG_KEY, value));
    }

    fn load_clarity(&self) {
        let Some(clarity_id) = self.config.clarity_id() else {
            return;
        };
        let src = format!("{CLARITY_TAG_URL}{clarity_id}");
        if best_effort("clarity", || self.scripts.inject(&src)).is_some() {
            info!(clarity_id, "clarity loader injected");
        }
    }
}

/// One delivery through the best-effort adapter. Returns whether the entry
/// point accepted the call.
fn deliver(backend: Backend, entry_point: &dyn EntryPoint, event: &CanonicalEvent) -> bool {
    let args = backend.invocation(event);
    best_effort(backend.id(), || entry_point.call(&args)).is_some()
}
