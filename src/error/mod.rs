//! Direct Authentication Error Types
//!
//! One consumable error hierarchy for OAuth2 protocol errors, API error
//! envelopes, and transport/format failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Terminal error of a direct authentication attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectAuthenticationError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

impl DirectAuthenticationError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(HttpError::Api(_)) => "DIRECT_AUTH_API",
            Self::Http(HttpError::OAuth2(_)) => "DIRECT_AUTH_OAUTH2",
            Self::Internal(e) => e.code.as_str(),
        }
    }

    /// HTTP status of the response that produced this error, if any.
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::Http(HttpError::Api(e)) => Some(e.http_status_code),
            Self::Http(HttpError::OAuth2(e)) => Some(e.http_status_code),
            Self::Internal(_) => None,
        }
    }

    /// Check if this error is a polling timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Internal(e) if e.is_timeout())
    }
}

/// Error reported by the authorization server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
    #[error("{0}")]
    Api(ApiError),

    #[error("{0}")]
    OAuth2(OAuth2Error),
}

/// Rich API error envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error_code}: {error_summary} (HTTP {http_status_code})")]
pub struct ApiError {
    pub error_code: String,
    pub error_summary: String,
    pub error_id: Option<String>,
    pub error_link: Option<String>,
    pub error_causes: Vec<ApiErrorCause>,
    pub http_status_code: u16,
}

/// Single cause inside an API error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorCause {
    #[serde(rename = "errorSummary")]
    pub error_summary: String,
}

/// OAuth2 error response (RFC 6749 Section 5.2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}: {} (HTTP {http_status_code})", .error_description.as_deref().unwrap_or("no description"))]
pub struct OAuth2Error {
    pub error: String,
    pub error_description: Option<String>,
    pub http_status_code: u16,
}

/// Internal error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalErrorCode {
    UnsupportedContentType,
    InvalidResponse,
    UnexpectedHttpStatus,
    Exception,
    UnknownError,
}

impl InternalErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType => "UNSUPPORTED_CONTENT_TYPE",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::UnexpectedHttpStatus => "UNEXPECTED_HTTP_STATUS",
            Self::Exception => "EXCEPTION",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for InternalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, clonable error source.
pub type ErrorSource = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Transport, format, or protocol-invariant failure.
#[derive(Clone)]
pub struct InternalError {
    pub code: InternalErrorCode,
    pub description: String,
    pub source: Option<ErrorSource>,
}

impl InternalError {
    /// Create an internal error without a source.
    pub fn new(code: InternalErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            source: None,
        }
    }

    /// Create an `Exception` error wrapping a source error.
    pub fn exception<E>(description: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            code: InternalErrorCode::Exception,
            description: description.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Protocol invariant violation with no underlying error.
    pub fn from_message(description: String) -> Self {
        Self::new(InternalErrorCode::Exception, description)
    }

    /// Check if the source is a [`PollingTimeoutError`].
    pub fn is_timeout(&self) -> bool {
        self.source
            .as_ref()
            .map(|s| (**s).downcast_ref::<PollingTimeoutError>().is_some())
            .unwrap_or(false)
    }
}

impl fmt::Debug for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalError")
            .field("code", &self.code)
            .field("description", &self.description)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for InternalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| &**s as &(dyn std::error::Error + 'static))
    }
}

// Sources are compared by message; they carry no identity of their own.
impl PartialEq for InternalError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.description == other.description
            && self.source.as_ref().map(|s| s.to_string())
                == other.source.as_ref().map(|s| s.to_string())
    }
}

/// Polling exceeded the binding context lifetime.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Polling timed out after {seconds} seconds.")]
pub struct PollingTimeoutError {
    pub seconds: u64,
}

/// Failure reported by an [`ApiExecutor`](crate::core::ApiExecutor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Invalid response body: {message}")]
    InvalidBody { message: String },

    #[error("Request canceled")]
    Canceled,
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid issuer URL: {url}")]
    InvalidIssuer { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type for context construction.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Get user-friendly error message.
pub fn get_user_message(error: &DirectAuthenticationError) -> String {
    match error {
        DirectAuthenticationError::Http(HttpError::OAuth2(e)) => e
            .error_description
            .clone()
            .unwrap_or_else(|| e.error.clone()),
        DirectAuthenticationError::Http(HttpError::Api(e)) => e.error_summary.clone(),
        DirectAuthenticationError::Internal(e) if e.is_timeout() => {
            "The request expired before it was approved. Please request a new code.".to_string()
        }
        DirectAuthenticationError::Internal(_) => {
            "An authentication error occurred. Please try again.".to_string()
        }
    }
}
