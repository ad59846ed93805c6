//! Error types for the GP client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when driving a geoprocessing job
///
/// A job that the server reports as failed or cancelled is NOT an error
/// here; that is a normal terminal status callers read off the job handle.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request could not be sent or the connection failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a status code outside [200, 300)
    #[error("server returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// Response body violated the expected wire shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server reported a job status token outside the known vocabulary
    #[error("unrecognized job status: {0}")]
    UnknownStatus(String),

    /// Poll was attempted before the job was submitted
    #[error("job has not been submitted")]
    NotSubmitted,

    /// Blocking wait exceeded the configured deadline
    #[error("timed out waiting for job to reach a terminal state")]
    PollTimeout,

    /// Blocking wait was cancelled through the cancellation token
    #[error("wait was cancelled")]
    Cancelled,
}

impl ClientError {
    /// Create an HTTP status error
    pub fn http_status(status: u16) -> Self {
        Self::HttpStatus { status }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::HttpStatus { status } if *status >= 500)
    }
}
