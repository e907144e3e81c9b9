//! Meta Pixel adaptor: `fbq("trackCustom", name, payload)`.

use serde_json::Value;
use tps_core::CanonicalEvent;

use super::WebAdaptor;

pub struct PixelAdaptor;

impl WebAdaptor for PixelAdaptor {
    fn global_name(&self) -> &'static str {
        "fbq"
    }

    fn invocation(&self, event: &CanonicalEvent) -> Vec<Value> {
        vec![
            Value::from("trackCustom"),
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
    fn test_fbq_call_convention() {
        let event = CanonicalEvent::new(
            "Add to Cart",
            7,
            attributes_from(json!({ "product_id": "p9", "price": 19.0 })),
        )
        .unwrap();

        let args = PixelAdaptor.invocation(&event);
        assert_eq!(args[0], "trackCustom");
        assert_eq!(args[1], "Add to Cart");
        assert_eq!(args[2]["event"], "Add to Cart");
        assert_eq!(args[2]["ts"], 7);
        assert_eq!(args[2]["product_id"], "p9");
    }
}
