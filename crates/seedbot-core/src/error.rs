//! Error types for configuration and host queries.

use thiserror::Error;

/// Errors raised while loading configuration or querying the host.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required environment variable is not set.
    #[error("{0} not set")]
    MissingEnv(&'static str),

    /// An environment variable is set but cannot be used.
    #[error("invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    /// The status command or a system query failed.
    #[error("host query failed: {0}")]
    HostQuery(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
