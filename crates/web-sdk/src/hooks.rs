//! Auto-hooks: declarative rules turning page interactions into canonical
//! events.
//!
//! Markup contract (theme side):
//!
//! ```html
//! <form data-newsletter data-location="footer">...</form>
//! <a href="/products/x" data-rec-product-id="123" data-rec-position="2" data-rec-source="homepage">..</a>
//! <button data-track-add data-product-id="123" data-product-name="Leash" data-price="19.90">..</button>
//! ```

use serde_json::{json, Value};
use tps_core::{attributes_from, Attributes};

use crate::events::{DomEvent, Element, ListenerPhase, PageContext};

pub const NEWSLETTER_SIGNUP: &str = "Newsletter Signup";
pub const PRODUCT_RECOMMENDED_CLICK: &str = "Product Recommended Click";
pub const ADD_TO_CART: &str = "Add to Cart";
pub const PAGE_VIEW: &str = "Page View";

/// Event a hook asks the dispatcher to track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub name: &'static str,
    pub attributes: Attributes,
}

impl TrackRequest {
    fn new(name: &'static str, attributes: Value) -> Self {
        Self {
            name,
            attributes: attributes_from(attributes),
        }
    }
}

/// A pure observer of DOM events.
pub trait AutoHook {
    fn name(&self) -> &'static str;

    /// Phase the hook listens in.
    fn phase(&self) -> ListenerPhase;

    fn observe(&self, event: &DomEvent) -> Option<TrackRequest>;
}

/// Submissions of `form[data-newsletter]`.
pub struct NewsletterHook;

impl AutoHook for NewsletterHook {
    fn name(&self) -> &'static str {
        "newsletter"
    }

    fn phase(&self) -> ListenerPhase {
        ListenerPhase::Target
    }

    fn observe(&self, event: &DomEvent) -> Option<TrackRequest> {
        let DomEvent::Submit { form, fields } = event else {
            return None;
        };
        if !form.is("form") || !form.has_attr("data-newsletter") {
            return None;
        }
        let email = fields
            .get("email")
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        Some(TrackRequest::new(
            NEWSLETTER_SIGNUP,
            json!({
                "email": email,
                "location": form.attr_or("data-location", "unknown"),
            }),
        ))
    }
}

/// Clicks inside `a[data-rec-product-id]`.
pub struct RecommendationClickHook;

impl AutoHook for RecommendationClickHook {
    fn name(&self) -> &'static str {
        "recommendation_click"
    }

    fn phase(&self) -> ListenerPhase {
        ListenerPhase::Capture
    }

    fn observe(&self, event: &DomEvent) -> Option<TrackRequest> {
        let anchor = event.closest(|el| el.is("a") && el.has_attr("data-rec-product-id"))?;

        Some(TrackRequest::new(
            PRODUCT_RECOMMENDED_CLICK,
            json!({
                "product_id": anchor.attr("data-rec-product-id").unwrap_or_default(),
                "position": parse_position(anchor),
                "source": anchor.attr_or("data-rec-source", "recommendations"),
            }),
        ))
    }
}

/// Clicks inside any element opted in with `data-track-add`.
pub struct AddToCartHook;

impl AutoHook for AddToCartHook {
    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    fn phase(&self) -> ListenerPhase {
        ListenerPhase::Capture
    }

    fn observe(&self, event: &DomEvent) -> Option<TrackRequest> {
        let button = event.closest(|el| el.has_attr("data-track-add"))?;

        Some(TrackRequest::new(
            ADD_TO_CART,
            json!({
                "product_id": button.attr_or("data-product-id", ""),
                "product_name": button.attr_or("data-product-name", ""),
                "price": parse_price(button),
                "source": button.attr_or("data-source", "button"),
            }),
        ))
    }
}

/// The hooks installed by `Dispatcher::initialize`.
pub fn default_hooks() -> Vec<Box<dyn AutoHook>> {
    vec![
        Box::new(NewsletterHook),
        Box::new(RecommendationClickHook),
        Box::new(AddToCartHook),
    ]
}

/// The single page view fired per initialization.
pub fn page_view(page: &PageContext) -> TrackRequest {
    TrackRequest::new(
        PAGE_VIEW,
        json!({
            "path": page.path,
            "title": page.title,
        }),
    )
}

fn parse_position(anchor: &Element) -> i64 {
    anchor
        .attr("data-rec-position")
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(0)
}

fn parse_price(button: &Element) -> f64 {
    button
        .attr("data-price")
        .and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}
