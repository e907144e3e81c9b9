//! Google Analytics 4 adaptor: `gtag("event", name, payload)`.

use serde_json::Value;
use tps_core::CanonicalEvent;

use super::WebAdaptor;

pub struct GaAdaptor;

impl WebAdaptor for GaAdaptor {
    fn global_name(&self) -> &'static str {
        "gtag"
    }

    fn invocation(&self, event: &CanonicalEvent) -> Vec<Value> {
        vec![
            Value::from("event"),
            Value::from(event.name()),
            event.payload(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tps_core::attributes_from;

    #[test]
    fn test_gtag_call_convention() {
        let event = CanonicalEvent::new(
            "Newsletter Signup",
            42,
            attributes_from(json!({ "email": "a@b.co", "location": "footer" })),
        )
        .unwrap();

        let args = GaAdaptor.invocation(&event);
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], "event");
        assert_eq!(args[1], "Newsletter Signup");
        assert_eq!(
            args[2],
            json!({
                "event": "Newsletter Signup",
                "ts": 42,
                "email": "a@b.co",
                "location": "footer"
            })
        );
    }
}
