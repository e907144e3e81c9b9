//! Adaptors translating canonical events into each backend's call convention.
//!
//! A backend's SDK installs a global entry point (`gtag`, `fbq`). The host
//! wraps that function in an [`EntryPoint`] and registers it with the
//! dispatcher; each [`WebAdaptor`] builds the exact argument list the entry
//! point expects.

pub mod breadcrumb;
pub mod ga;
pub mod pixel;

use std::fmt;

use serde_json::Value;
use tps_core::{CanonicalEvent, TrackingResult};

use self::ga::GaAdaptor;
use self::pixel::PixelAdaptor;

/// Analytics backends that receive canonical events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    /// Google Analytics 4 through `gtag`.
    Ga4,
    /// Meta Pixel through `fbq`.
    MetaPixel,
}

impl Backend {
    /// Every backend, in fan-out order.
    pub const ALL: [Backend; 2] = [Backend::Ga4, Backend::MetaPixel];

    /// Identifier used in configuration and logs.
    pub fn id(self) -> &'static str {
        match self {
            Backend::Ga4 => "ga4",
            Backend::MetaPixel => "meta_pixel",
        }
    }

    /// Name of the global function the backend's SDK installs.
    pub fn global_name(self) -> &'static str {
        self.adaptor().global_name()
    }

    pub fn adaptor(self) -> &'static dyn WebAdaptor {
        match self {
            Backend::Ga4 => &GaAdaptor,
            Backend::MetaPixel => &PixelAdaptor,
        }
    }

    /// Arguments for one delivery of `event` to this backend.
    pub fn invocation(self, event: &CanonicalEvent) -> Vec<Value> {
        self.adaptor().invocation(event)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Adaptor trait: builds a backend's call arguments for a canonical event.
pub trait WebAdaptor: Send + Sync {
    /// Global function name, e.g. "gtag".
    fn global_name(&self) -> &'static str;

    fn invocation(&self, event: &CanonicalEvent) -> Vec<Value>;
}

/// A present backend's global entry point.
pub trait EntryPoint: Send + Sync {
    fn call(&self, args: &[Value]) -> TrackingResult<()>;
}

impl<F> EntryPoint for F
where
    F: Fn(&[Value]) -> TrackingResult<()> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> TrackingResult<()> {
        self(args)
    }
}
