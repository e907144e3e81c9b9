//! GA4 Measurement Protocol body built from a [`ProxyRequest`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::ProxyRequest;

/// `{ client_id, events: [{ name, params }] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamPayload {
    pub client_id: String,
    pub events: Vec<UpstreamEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamEvent {
    pub name: String,
    pub params: EventParams,
}

/// Page context plus the optional e-commerce fields. Absent fields are
/// left out of the body entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParams {
    pub page_location: String,
    pub page_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Value>>,
}

impl UpstreamPayload {
    pub fn from_request(request: &ProxyRequest, client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            events: vec![UpstreamEvent {
                name: request.event.clone(),
                params: EventParams {
                    page_location: request.location.clone(),
                    page_title: request.title.clone(),
                    value: request.value,
                    currency: request.currency.clone(),
                    transaction_id: request.transaction_id.clone(),
                    items: request.items.clone(),
                },
            }],
        }
    }

    /// Name of the (single) forwarded event.
    pub fn event_name(&self) -> &str {
        self.events.first().map_or("", |e| e.name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_fields_omitted() {
        let payload = UpstreamPayload::from_request(&ProxyRequest::default(), "cid-1");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "client_id": "cid-1",
                "events": [{
                    "name": "page_view",
                    "params": { "page_location": "", "page_title": "" }
                }]
            })
        );
    }

    #[test]
    fn test_ecommerce_fields_included() {
        let request = ProxyRequest {
            event: "purchase".into(),
            value: Some(42.5),
            currency: Some("EUR".into()),
            transaction_id: Some("T-9".into()),
            items: Some(vec![json!({ "id": "p1", "quantity": 2 })]),
            ..ProxyRequest::default()
        };
        let body = serde_json::to_value(UpstreamPayload::from_request(&request, "cid")).unwrap();
        let params = &body["events"][0]["params"];
        assert_eq!(body["events"][0]["name"], "purchase");
        assert_eq!(params["value"], 42.5);
        assert_eq!(params["currency"], "EUR");
        assert_eq!(params["transaction_id"], "T-9");
        assert_eq!(params["items"][0]["quantity"], 2);
    }
}
