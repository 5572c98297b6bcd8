//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. It wraps transport, serialization, storage and
//! backend errors into a unified enum.

use reqwest::StatusCode;
use servicedue_models::ModelError;

/// Message shown when a failure carries nothing better to tell the user.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid or missing configuration (e.g. bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend rejected the bearer token (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response.
    #[error("API error {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: StatusCode,
        /// `detail` from the response body, when the backend sent one.
        detail: Option<String>,
    },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An authenticated call was made without a session.
    #[error("not signed in")]
    NotSignedIn,

    /// The stored session is past its expiry and was discarded.
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// Input rejected before any request was made.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl SdkError {
    /// The message to put in front of the user.
    ///
    /// Backend-provided details are shown verbatim; everything else falls
    /// back to [`GENERIC_FAILURE`].
    pub fn banner(&self) -> String {
        match self {
            SdkError::Api {
                detail: Some(detail),
                ..
            }
            | SdkError::Unauthorized(detail)
                if !detail.is_empty() =>
            {
                detail.clone()
            }
            SdkError::NotSignedIn => "Please sign in first.".to_string(),
            SdkError::SessionExpired => self.to_string(),
            SdkError::Model(e) => e.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// `true` when the caller should discard its session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SdkError::Unauthorized(_) | SdkError::SessionExpired)
    }
}
