use thiserror::Error;

pub type TrackingResult<T> = Result<T, TrackingError>;

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Event name must not be empty")]
    EmptyEventName,

    #[error("Backend sink error ({backend}): {message}")]
    Sink { backend: String, message: String },

    #[error("Script loader error: {0}")]
    Script(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Missing measurement credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("Invalid measurement endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Upstream forwarding error: {0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TrackingError {
    /// Shorthand for a failure reported by a backend entry point.
    pub fn sink(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
