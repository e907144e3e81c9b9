//! Integrations configuration injected into the page as a JSON blob.
//!
//! Read once when the dispatcher is built and never reloaded. A missing or
//! malformed blob disables every backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::adaptors::Backend;

/// Backend credentials and ids. An empty value disables the integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ga4: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub meta_pixel_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sentry_dsn: String,
    /// Informational only.
    #[serde(default, deserialize_with = "lenient_string")]
    pub cloudflare_beacon_token: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clarity_id: String,
}

impl IntegrationsConfig {
    /// Parse the injected blob. Absent, empty or malformed input yields the
    /// empty configuration.
    pub fn from_blob(blob: Option<&str>) -> Self {
        let Some(text) = blob.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::default();
        };
        // Only an object carries keys; arrays and scalars read as empty.
        let parsed = serde_json::from_str::<Value>(text).and_then(|value| match value {
            Value::Object(_) => serde_json::from_value::<Self>(value).map(Some),
            _ => Ok(None),
        });
        match parsed {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("integrations blob is not an object, all backends disabled");
                Self::default()
            }
            Err(e) => {
                debug!(error = %e, "integrations blob unreadable, all backends disabled");
                Self::default()
            }
        }
    }

    /// Credential for a backend, `None` when the backend is disabled.
    pub fn credential(&self, backend: Backend) -> Option<&str> {
        let value = match backend {
            Backend::Ga4 => &self.ga4,
            Backend::MetaPixel => &self.meta_pixel_id,
        };
        non_empty(value)
    }

    pub fn is_enabled(&self, backend: Backend) -> bool {
        self.credential(backend).is_some()
    }

    /// Backends with a credential, in fan-out order.
    pub fn enabled_backends(&self) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|b| self.is_enabled(*b))
            .collect()
    }

    pub fn sentry_dsn(&self) -> Option<&str> {
        non_empty(&self.sentry_dsn)
    }

    pub fn clarity_id(&self) -> Option<&str> {
        non_empty(&self.clarity_id)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Strings pass through; `null` and every other JSON type read as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}
