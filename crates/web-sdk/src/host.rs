//! Host page collaborators the dispatcher depends on: durable local storage,
//! third-party script injection and a wall clock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tps_core::TrackingResult;
use tracing::debug;

/// Durable key-value store of the browser (local storage).
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> TrackingResult<()>;
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> TrackingResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Injects an asynchronous third-party loader script into the page.
pub trait ScriptLoader {
    fn inject(&self, src: &str) -> TrackingResult<()>;
}

/// Loader that only records the requested sources. Clones share the list.
#[derive(Debug, Clone, Default)]
pub struct RecordingScriptLoader {
    sources: Arc<Mutex<Vec<String>>>,
}

impl RecordingScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().clone()
    }
}

impl ScriptLoader for RecordingScriptLoader {
    fn inject(&self, src: &str) -> TrackingResult<()> {
        debug!(src, "script injection requested");
        self.sources.lock().push(src.to_string());
        Ok(())
    }
}

/// Time source for event timestamps.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
