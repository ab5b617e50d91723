//! Two-variant outcome of a settled API call.
//!
//! # Design
//! `ApiResult` is what every call wrapper hands back. It is built only after
//! the underlying request settles, so there is no pending state, and the
//! variant never changes after construction. The error side defaults to
//! `BasicError` because that is the shape every failure is normalized into.
//!
//! It converts to and from `std::result::Result` so callers can use `?` once
//! they have decided how to treat the error.

use std::fmt;

use crate::error::BasicError;

/// Discriminant of an [`ApiResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Ok,
    Err,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Ok => "ok",
            Tag::Err => "err",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a fallible operation: a value or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use = "an ApiResult may carry an error that should be inspected"]
pub enum ApiResult<V, E = BasicError> {
    Ok(V),
    Err(E),
}

/// Construct the success variant.
pub fn ok<V, E>(value: V) -> ApiResult<V, E> {
    ApiResult::Ok(value)
}

/// Construct the failure variant.
pub fn err<V, E>(error: E) -> ApiResult<V, E> {
    ApiResult::Err(error)
}

impl<V, E> ApiResult<V, E> {
    pub fn tag(&self) -> Tag {
        match self {
            ApiResult::Ok(_) => Tag::Ok,
            ApiResult::Err(_) => Tag::Err,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResult::Ok(_))
    }

    pub fn is_err(&self) -> bool {
        matches!(self, ApiResult::Err(_))
    }

    /// The success payload, if this is `Ok`.
    pub fn value(&self) -> Option<&V> {
        match self {
            ApiResult::Ok(value) => Some(value),
            ApiResult::Err(_) => None,
        }
    }

    /// The error payload, if this is `Err`.
    pub fn error(&self) -> Option<&E> {
        match self {
            ApiResult::Ok(_) => None,
            ApiResult::Err(error) => Some(error),
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            ApiResult::Ok(value) => Some(value),
            ApiResult::Err(_) => None,
        }
    }

    pub fn into_error(self) -> Option<E> {
        match self {
            ApiResult::Ok(_) => None,
            ApiResult::Err(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<V, E> {
        match self {
            ApiResult::Ok(value) => Ok(value),
            ApiResult::Err(error) => Err(error),
        }
    }

    pub fn as_ref(&self) -> ApiResult<&V, &E> {
        match self {
            ApiResult::Ok(value) => ApiResult::Ok(value),
            ApiResult::Err(error) => ApiResult::Err(error),
        }
    }

    pub fn map<U, F: FnOnce(V) -> U>(self, f: F) -> ApiResult<U, E> {
        match self {
            ApiResult::Ok(value) => ApiResult::Ok(f(value)),
            ApiResult::Err(error) => ApiResult::Err(error),
        }
    }

    pub fn map_err<G, F: FnOnce(E) -> G>(self, f: F) -> ApiResult<V, G> {
        match self {
            ApiResult::Ok(value) => ApiResult::Ok(value),
            ApiResult::Err(error) => ApiResult::Err(f(error)),
        }
    }
}

impl<V, E> From<Result<V, E>> for ApiResult<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => ApiResult::Ok(value),
            Err(error) => ApiResult::Err(error),
        }
    }
}

impl<V, E> From<ApiResult<V, E>> for Result<V, E> {
    fn from(result: ApiResult<V, E>) -> Self {
        result.into_result()
    }
}
