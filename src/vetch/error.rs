//! Errors raised by [`crate::Vetch::request`].
//!
//! Transport failures are not listed here: they reach the caller as the
//! transport's own error type.

use super::response::VetchResponse;

/// Invalid configuration, detected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No non-empty `url` after merging defaults and options.
    MissingUrl,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingUrl => write!(f, "URL is required."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A completed exchange whose status was rejected by the status check.
#[derive(Debug)]
pub struct RequestError {
    pub message: String,
    /// The HTTP status as a string, e.g. `"404"`.
    pub code: String,
    /// The full response, for inspecting headers and body of the failed call.
    pub response: Box<VetchResponse>,
}

impl RequestError {
    pub fn new(response: VetchResponse) -> Self {
        Self {
            message: format!("Request failed with status code {}", response.status),
            code: response.status.to_string(),
            response: Box::new(response),
        }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestError {}
