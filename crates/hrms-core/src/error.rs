//! Error types for the HRMS client.
//!
//! A single [`Error`] enum with explicit variants for transport failures,
//! authentication outcomes, backend errors passed through from the API,
//! input validation, and credential storage.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The unified error type for HRMS client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No response was received (DNS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication could not be established or recovered.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-2xx status other than 401.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (bad URL, method, or body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The credential store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns the backend error this failure carries, if any.
    ///
    /// Authentication errors raised while recovering a request keep the 401
    /// that started them, so those report it here too.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            Error::Auth(err) => err.original(),
            _ => None,
        }
    }

    /// True when this failure ended the session (credentials were cleared).
    pub fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            Error::Auth(
                AuthError::Unauthenticated { .. }
                    | AuthError::RetryRejected { .. }
                    | AuthError::RefreshFailed { .. }
            )
        )
    }
}

/// Transport-level errors: the request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be read or decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP client error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication failures.
///
/// Every variant raised by the recovery path keeps the original 401 so
/// callers can still inspect what the backend said.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request was rejected and no access token exists locally.
    #[error("not authenticated ({original})")]
    Unauthenticated { original: ApiError },

    /// The request was rejected and recovery was not attempted.
    #[error("credentials rejected ({original})")]
    Rejected { original: ApiError },

    /// A request already replayed after a refresh was rejected again.
    #[error("credentials rejected after refresh ({original})")]
    RetryRejected { original: ApiError },

    /// The token refresh failed; the session is over.
    ///
    /// `original` is the rejection that led to the refresh, absent when the
    /// refresh was requested explicitly.
    #[error("token refresh failed: {reason}")]
    RefreshFailed {
        original: Option<ApiError>,
        reason: String,
    },

    /// The login endpoint rejected the supplied credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl AuthError {
    /// The backend rejection that triggered this error.
    pub fn original(&self) -> Option<&ApiError> {
        match self {
            AuthError::Unauthenticated { original }
            | AuthError::Rejected { original }
            | AuthError::RetryRejected { original } => Some(original),
            AuthError::RefreshFailed { original, .. } => original.as_ref(),
            AuthError::InvalidCredentials(_) => None,
        }
    }
}

/// A non-2xx response from the backend.
///
/// `payload` is the structured error body exactly as the backend sent it.
/// `code` and `message` are convenience extractions from that body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Backend error code (`code`, falling back to `error`).
    pub code: Option<String>,
    /// Human-readable message from the backend.
    pub message: Option<String>,
    /// The raw JSON error body, if the body was JSON.
    pub payload: Option<Value>,
}

impl ApiError {
    /// Create an error with no body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            code: None,
            message: None,
            payload: None,
        }
    }

    /// Build an error from a status and the raw response body.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let Ok(payload) = serde_json::from_slice::<Value>(body) else {
            return Self::new(status);
        };

        let code = string_field(&payload, "code").or_else(|| string_field(&payload, "error"));
        let message = match payload.get("message") {
            Some(Value::String(s)) => Some(s.clone()),
            // Validation failures come back as a list of messages.
            Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(String::from),
            _ => None,
        };

        Self {
            status,
            code,
            message,
            payload: Some(payload),
        }
    }

    /// True when the backend rejected the presented credential.
    pub fn is_auth_rejected(&self) -> bool {
        self.status == 401
    }
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(String::from)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A request body that could not be serialized.
    #[error("invalid request body: {message}")]
    Body { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {location}: {message}")]
    Io { location: String, message: String },

    /// Persisted credentials could not be parsed.
    #[error("corrupt credential data in {location}: {message}")]
    Corrupt { location: String, message: String },
}
