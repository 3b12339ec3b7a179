//! Errors from the imaging server.

use thiserror::Error;

/// Failure of one request to the imaging/measurement server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection failure, timeout, or a request that could not be sent
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The expected field is absent or not a number
    #[error("Unexpected server response (no numeric '{field}'): {payload}")]
    Malformed { field: &'static str, payload: String },

    /// Preview bytes are not a decodable image
    #[error("Could not decode preview: {0}")]
    Decode(#[from] image::ImageError),

    /// The configured server address cannot be used as a base URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// The request worker is gone
    #[error("Request worker is not running")]
    WorkerGone,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}
