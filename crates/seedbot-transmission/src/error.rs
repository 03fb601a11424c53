//! Error types for daemon operations.

use thiserror::Error;

use crate::types::TorrentId;

/// Errors that can occur while talking to the torrent daemon.
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Network or transport failure.
    #[error("http error: {0}")]
    Http(String),

    /// The daemon answered with a non-success HTTP status.
    #[error("daemon returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The RPC call completed but reported a failure.
    #[error("rpc failed: {0}")]
    Rpc(String),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The torrent id cannot refer to a daemon torrent.
    #[error("invalid torrent id: {0}")]
    InvalidId(TorrentId),

    /// HTTP 409 without the session header.
    #[error("daemon did not provide a session id")]
    MissingSessionId,
}

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

impl From<reqwest::Error> for DaemonError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DaemonError::Decode(e.to_string())
        } else {
            DaemonError::Http(e.to_string())
        }
    }
}
