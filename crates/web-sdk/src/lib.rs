#![warn(clippy::unwrap_used)]

//! Client-side event dispatcher: turns page interactions and explicit calls
//! into canonical events and delivers them to the analytics backends present
//! on the page, queueing for the ones that have not loaded yet.
//!
//! # Modules
//!
//! - [`config`]: integrations blob loader
//! - [`adaptors`]: backend call conventions (GA4 `gtag`, Meta `fbq`, breadcrumbs)
//! - [`registry`]: capability registry of present backends
//! - [`queue`]: per-backend pending queues
//! - [`scheduler`]: virtual-time timer queue
//! - [`hooks`]: auto-hooks over DOM events
//! - [`dispatcher`]: the dispatcher context tying it together

pub mod adaptors;
pub mod best_effort;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod hooks;
pub mod host;
pub mod queue;
pub mod registry;
pub mod scheduler;

pub use adaptors::breadcrumb::{Breadcrumb, BreadcrumbHub};
pub use adaptors::{Backend, EntryPoint, WebAdaptor};
pub use config::IntegrationsConfig;
pub use dispatcher::{Dispatcher, FlushReport};
pub use events::{DomEvent, Element, ListenerPhase, PageContext};
