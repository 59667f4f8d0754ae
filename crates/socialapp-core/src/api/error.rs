//! Error taxonomy for backend requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured error body returned by the backend.
///
/// The backend answers validation failures with an object keyed by field
/// (`{"email": "Must not be empty"}`) or with a `general` message
/// (`{"general": "Wrong credentials, please try again"}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorPayload(pub Map<String, Value>);

impl ErrorPayload {
    /// Builds a payload carrying only a `general` message.
    pub fn general(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("general".to_string(), Value::String(message.into()));
        Self(map)
    }

    /// Returns the message for a field, if the backend sent a string for it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Parses a response body as a structured payload.
    ///
    /// Only non-empty JSON objects qualify; anything else is not a payload.
    pub fn from_body(body: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) if !map.is_empty() => Some(Self(map)),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(general) = self.field("general") {
            return write!(f, "{general}");
        }
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match value.as_str() {
                Some(text) => write!(f, "{key}: {text}")?,
                None => write!(f, "{key}: {value}")?,
            }
        }
        Ok(())
    }
}

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Backend answered with a structured error body (forwarded to the UI).
    Rejected,
    /// Non-2xx status without a structured body.
    HttpStatus,
    /// Connection failed before a response arrived.
    Transport,
    /// Request exceeded the configured timeout.
    Timeout,
    /// Response body did not match the expected shape.
    Parse,
    /// Request was cancelled locally.
    Cancelled,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Rejected => write!(f, "rejected"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Failed backend request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display.
    pub message: String,
    /// Structured body, present only for `Rejected`.
    pub payload: Option<ErrorPayload>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    /// Classifies a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        match ErrorPayload::from_body(body) {
            Some(payload) => Self {
                kind: ApiErrorKind::Rejected,
                message: format!("HTTP {status}: {payload}"),
                payload: Some(payload),
            },
            None if body.trim().is_empty() => {
                Self::new(ApiErrorKind::HttpStatus, format!("HTTP {status}"))
            }
            None => Self::new(
                ApiErrorKind::HttpStatus,
                format!("HTTP {status}: {}", body.trim()),
            ),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ApiErrorKind::Cancelled, "Request cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ApiErrorKind::Cancelled
    }

    /// Returns true if the backend sent a payload meant for the user.
    pub fn is_rejected(&self) -> bool {
        self.kind == ApiErrorKind::Rejected
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ApiErrorKind::Timeout
        } else if err.is_decode() {
            ApiErrorKind::Parse
        } else {
            ApiErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend requests.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
