use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for OSTI client operations
#[derive(Error, Debug)]
pub enum OstiError {
    /// HTTP request failed (DNS, connection, timeout)
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A link relation or record lacks a required field
    #[error("Required field missing: {field}")]
    FieldMissing { field: String },

    /// The response carried no `X-Total-Count` header
    #[error("Response is missing the X-Total-Count header")]
    TotalCountMissing,

    /// The `X-Total-Count` header is not a non-negative integer
    #[error("Invalid X-Total-Count header value: {value:?}")]
    TotalCountInvalid { value: String },

    /// Date string not in MM/DD/YYYY form
    #[error("Invalid date {value:?}, expected MM/DD/YYYY")]
    InvalidDate { value: String },

    /// Invalid endpoint or query parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// API rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// Non-success HTTP status, raised only on request
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
}

pub type Result<T> = result::Result<T, OstiError>;

impl OstiError {
    pub(crate) fn field_missing(field: &str) -> Self {
        OstiError::FieldMissing {
            field: field.to_string(),
        }
    }
}

impl RetryableError for OstiError {
    fn is_retryable(&self) -> bool {
        match self {
            OstiError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                // DNS and other network errors
                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            OstiError::RateLimitExceeded => true,

            OstiError::ApiError { status, .. } => {
                (*status >= 500 && *status < 600) || *status == 429
            }

            OstiError::JsonError(_)
            | OstiError::FieldMissing { .. }
            | OstiError::TotalCountMissing
            | OstiError::TotalCountInvalid { .. }
            | OstiError::InvalidDate { .. }
            | OstiError::InvalidParameter(_) => false,
        }
    }

    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            match self {
                OstiError::RequestError(err) if err.is_timeout() => "Request timeout",
                OstiError::RequestError(err) if err.is_connect() => "Connection error",
                OstiError::RequestError(_) => "Network error",
                OstiError::RateLimitExceeded => "Rate limit exceeded",
                OstiError::ApiError { status: 429, .. } => "Rate limit exceeded",
                OstiError::ApiError { .. } => "Server error",
                _ => "Transient error",
            }
        } else {
            match self {
                OstiError::JsonError(_) => "Invalid JSON response",
                OstiError::FieldMissing { .. } => "Malformed record",
                OstiError::TotalCountMissing | OstiError::TotalCountInvalid { .. } => {
                    "Invalid response headers"
                }
                OstiError::InvalidDate { .. } | OstiError::InvalidParameter(_) => "Invalid input",
                _ => "Non-transient error",
            }
        }
    }
}
