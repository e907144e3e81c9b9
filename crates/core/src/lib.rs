pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{TrackingError, TrackingResult};
pub use types::{attributes_from, Attributes, CanonicalEvent};
