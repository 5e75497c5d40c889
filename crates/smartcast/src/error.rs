use thiserror::Error;

/// Result type for SmartCast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a SmartCast device
#[derive(Error, Debug)]
pub enum Error {
    /// An authenticated endpoint was called without an auth token configured.
    ///
    /// The display text is load-bearing: callers match on it to give pairing
    /// guidance, so keep it stable.
    #[error("Empty auth token")]
    EmptyAuthToken,

    /// Transport-level HTTP error (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The device does not expose this endpoint, usually a sign the wrong
    /// device class was declared
    #[error("URI not found on device: {path}")]
    UriNotFound { path: String },

    /// The device answered but refused the request
    #[error("Device rejected request: {detail}")]
    Rejected { detail: String },

    /// The device answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// App name not present in the bundled app registry
    #[error("Unknown app: {0}")]
    UnknownApp(String),

    /// The blocking worker task was cancelled or panicked
    #[error("Device task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
