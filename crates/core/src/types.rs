use crate::error::{TrackingError, TrackingResult};
use serde::Serialize;
use serde_json::Value;

/// Flat mapping of event attributes. Values are any JSON value, in practice
/// scalars or short sequences.
pub type Attributes = serde_json::Map<String, Value>;

/// Backend-agnostic representation of something worth recording.
///
/// Fields are private: once built, an event can only be read. Dispatch
/// shares a single instance between backends behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEvent {
    name: String,
    timestamp: i64,
    attributes: Attributes,
}

impl CanonicalEvent {
    /// Build an event. Fails on an empty name.
    pub fn new(
        name: impl Into<String>,
        timestamp: i64,
        attributes: Attributes,
    ) -> TrackingResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TrackingError::EmptyEventName);
        }
        Ok(Self {
            name,
            timestamp,
            attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Payload handed to every backend: `{ event, ts, ...attributes }`.
    /// Attributes win on key collision.
    pub fn payload(&self) -> Value {
        let mut payload = Attributes::new();
        payload.insert("event".to_string(), Value::String(self.name.clone()));
        payload.insert("ts".to_string(), Value::from(self.timestamp));
        for (key, value) in &self.attributes {
            payload.insert(key.clone(), value.clone());
        }
        Value::Object(payload)
    }
}

/// Convert an arbitrary JSON value into attributes. Anything other than an
/// object yields an empty mapping.
pub fn attributes_from(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}
