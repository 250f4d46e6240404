//! Error types for the kintone SDK.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for SDK operations.
pub type KintoneResult<T> = Result<T, KintoneError>;

/// Error types that can occur when using the kintone SDK.
///
/// The set is closed: callers are expected to match on it (or on
/// [`ErrorKind`]) and decide their own formatting and retry policy. The
/// client itself never retries.
#[derive(Debug, thiserror::Error)]
pub enum KintoneError {
    /// Missing or unusable credentials / settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A client-side argument check failed. No request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP 401.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication {
        status: u16,
        message: String,
        code: Option<String>,
        errors: Option<Value>,
    },

    /// HTTP 403.
    #[error("Permission denied (status {status}): {message}")]
    Permission {
        status: u16,
        message: String,
        code: Option<String>,
        errors: Option<Value>,
    },

    /// HTTP 429.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        code: Option<String>,
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        errors: Option<Value>,
    },

    /// The request never produced an HTTP response (timeout, DNS, refused).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file access for uploads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`KintoneError`], handy for logging and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Authentication,
    Permission,
    RateLimit,
    Api,
    Network,
    Decode,
    Io,
}

impl KintoneError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network(_) => ErrorKind::Network,
            Self::Json(_) => ErrorKind::Decode,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::Permission { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Platform error code such as `GAIA_RE01`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. }
            | Self::Permission { code, .. }
            | Self::RateLimited { code, .. }
            | Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Per-field error map returned by the platform.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Authentication { errors, .. }
            | Self::Permission { errors, .. }
            | Self::Api { errors, .. } => errors.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether a caller could reasonably retry. The client never does.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Normalize a non-success response into the matching error kind.
    pub fn from_response(status: u16, body: &str, retry_after_secs: Option<u64>) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let (message, code, errors) = match parsed {
            Some(resp) => (
                resp.message.unwrap_or_else(|| format!("HTTP {}", status)),
                resp.code,
                resp.errors,
            ),
            None => (format!("HTTP {}", status), None, None),
        };

        match status {
            401 => Self::Authentication {
                status,
                message,
                code,
                errors,
            },
            403 => Self::Permission {
                status,
                message,
                code,
                errors,
            },
            429 => Self::RateLimited {
                message,
                code,
                retry_after_secs,
            },
            _ => Self::Api {
                status,
                message,
                code,
                errors,
            },
        }
    }
}

/// Error body returned by the kintone REST API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}
