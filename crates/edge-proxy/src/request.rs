//! Inbound event request, parsed from the query string.

use std::collections::HashMap;

use serde_json::Value;

/// Event name used when the caller sends none.
pub const DEFAULT_EVENT: &str = "page_view";

/// Parameters of one forward request. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    pub event: String,
    pub location: String,
    pub title: String,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub transaction_id: Option<String>,
    pub items: Option<Vec<Value>>,
}

impl Default for ProxyRequest {
    fn default() -> Self {
        Self {
            event: DEFAULT_EVENT.to_string(),
            location: String::new(),
            title: String::new(),
            value: None,
            currency: None,
            transaction_id: None,
            items: None,
        }
    }
}

impl ProxyRequest {
    /// Parse a raw (percent-encoded) query string. Parsing never fails:
    /// unusable optional fields are dropped.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        // First occurrence of a repeated parameter wins.
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        let mut take = |name: &str| params.remove(name).filter(|v| !v.is_empty());

        Self {
            event: take("event").unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            location: take("location").unwrap_or_default(),
            title: take("title").unwrap_or_default(),
            value: take("value").and_then(|v| parse_value(&v)),
            currency: take("currency"),
            transaction_id: take("transaction_id"),
            items: take("items").and_then(|v| parse_items(&v)),
        }
    }
}

/// Numeric parse; anything non-numeric or non-finite is absent.
fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// JSON array parse; malformed JSON or a non-array is absent.
fn parse_items(raw: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}
