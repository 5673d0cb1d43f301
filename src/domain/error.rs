// Error types shared by the application and infrastructure layers
use std::time::Duration;
use thiserror::Error;

/// Problems with the connection parameters. Never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing connection parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Failures talking to the upstream reading source.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("request to upstream failed: {0}")]
    Transport(String),

    #[error("upstream query failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("upstream request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("subscription failed: {0}")]
    Subscription(String),
}
