//! Error types for the micro-url API client.
//!
//! # Design
//! Two layers. `ApiError` is the raw failure taxonomy produced while building
//! a request, moving it over the wire, or parsing the response. `BasicError`
//! is the single `{ "error": string }` shape every failure is normalized into
//! before it reaches a caller of the call wrappers.
//!
//! Normalization first tries to parse the failure into the known error shape
//! (a backend that answered with `{"error": "..."}` is passed through
//! untouched). Anything else is serialized to JSON text, and if even that
//! fails the `Display` string is used, so normalization itself cannot fail.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw failure of a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// No response was received: connection refused, DNS, TLS, timeout.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx body could not be decoded into the expected type.
    #[error("deserialization failed: {message}")]
    Deserialization { message: String },

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {message}")]
    Serialization { message: String },

    /// A binary response was missing or carried unusable content headers.
    #[error("Invalid response headers: {message}")]
    InvalidHeaders { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn invalid_headers(message: impl Into<String>) -> Self {
        Self::InvalidHeaders {
            message: message.into(),
        }
    }

    /// Status code of a non-2xx response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The canonical error shape: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicError {
    pub error: String,
}

impl BasicError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Read the error shape out of an already-decoded JSON value.
    ///
    /// Succeeds only for an object whose `error` field is a string. Extra
    /// fields are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.get("error").and_then(Value::as_str).map(Self::new)
    }

    /// Parse a raw response body into the error shape.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        Self::from_value(&value)
    }
}

impl fmt::Display for BasicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

impl std::error::Error for BasicError {}

/// A failure that can be folded into a `BasicError`.
///
/// The provided method parses the failure into the `{error}` shape, then
/// falls back to its JSON text, then to its `Display` string. Types with
/// their own rules override it; `normalize` always goes through here.
pub trait Normalize: Serialize + fmt::Display {
    fn normalize(&self) -> BasicError {
        match serde_json::to_value(self) {
            Ok(value) => BasicError::from_value(&value).unwrap_or_else(|| BasicError::new(value.to_string())),
            Err(_) => BasicError::new(self.to_string()),
        }
    }
}

impl Normalize for BasicError {}

impl Normalize for Value {}

impl Normalize for ApiError {
    fn normalize(&self) -> BasicError {
        match self {
            ApiError::HttpStatus { body, .. } => {
                BasicError::parse(body.as_bytes()).unwrap_or_else(|| serialized(self))
            }
            ApiError::Transport { .. } | ApiError::InvalidHeaders { .. } => BasicError::new(self.to_string()),
            ApiError::Deserialization { .. } | ApiError::Serialization { .. } => serialized(self),
        }
    }
}

/// JSON text of the failure, or its `Display` string if that fails.
fn serialized(failure: &ApiError) -> BasicError {
    serde_json::to_string(failure)
        .map(BasicError::new)
        .unwrap_or_else(|_| BasicError::new(failure.to_string()))
}

/// Convert any failure into a `BasicError`. Total: never panics.
pub fn normalize<F: Normalize + ?Sized>(failure: &F) -> BasicError {
    failure.normalize()
}

impl From<ApiError> for BasicError {
    fn from(failure: ApiError) -> Self {
        normalize(&failure)
    }
}
