//! Client error types and display-message normalization.
//!
//! [`Error`] is the transport-layer error: every failure produced while
//! talking to the ip-hop API is one of its variants. The free functions at
//! the bottom of this module turn *any* caught value into a string that can
//! be shown to the user directly, using a fixed precedence:
//!
//! 1. transport error carrying a non-empty `detail` from the response body
//! 2. transport error with a non-empty message
//! 3. transport error with neither: [`GENERIC_ERROR_MESSAGE`]
//! 4. any other error-like value with a non-empty message
//! 5. anything else: [`UNKNOWN_ERROR_MESSAGE`]
//!
//! [`error_message!`](crate::error_message!) applies the table to any value
//! whose type is known at the call site, so every `std::error::Error`
//! implementor takes rule 4. [`error_message`] works on type-erased
//! `&dyn Any` values and can only recognize error types it knows by name.

use std::any::Any;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback for transport errors that carry no usable text.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Fallback for values that are not recognized as errors at all.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was received, or the
    /// response body could not be read.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, when it was a string.
        detail: Option<String>,
        /// Top-level error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-provided `detail`, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Top-level message, without consulting `detail`.
    pub fn message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check if this is a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Message suitable for direct display: `detail`, then message, then
    /// [`GENERIC_ERROR_MESSAGE`].
    pub fn display_message(&self) -> String {
        if let Some(detail) = self.detail().filter(|d| !d.is_empty()) {
            return detail.to_string();
        }
        let message = self.message();
        if message.is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Build the displayable [`ApiError`] view of this error.
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            message: self.display_message(),
            detail: self.detail().map(str::to_owned),
            status: self.status(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Displayable summary of a failed call.
///
/// `message` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        err.to_api_error()
    }
}

/// Error body returned by the server on non-2xx responses.
///
/// Validation failures carry a list in `detail`, and some proxies put
/// objects in `message`, so both are kept as raw values and only used when
/// they are strings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub(crate) fn into_error(self, status: u16) -> Error {
        let detail = match self.detail {
            Some(serde_json::Value::String(detail)) => Some(detail),
            _ => None,
        };
        let message = match self.message {
            Some(serde_json::Value::String(message)) if !message.is_empty() => message,
            _ => status_message(status),
        };
        Error::Api {
            status,
            detail,
            message,
        }
    }
}

/// Message used when the server did not supply one.
pub(crate) fn status_message(status: u16) -> String {
    format!("Request failed with status code {}", status)
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Report whether `value` is a transport-layer error.
///
/// True for [`Error`] and for a bare [`reqwest::Error`]; false for every
/// other type, including unit, strings, numbers and generic errors.
pub fn is_transport_error(value: &dyn Any) -> bool {
    value.is::<Error>() || value.is::<reqwest::Error>()
}

/// Convert a type-erased caught value into a user-facing message.
///
/// A `&dyn Any` only reveals types it is asked about by name, so the
/// error-like values recognized here are [`Error`], [`reqwest::Error`],
/// boxed `std::error::Error` trait objects and the standard library and
/// dependency error types listed in `known_error`. Everything else maps to
/// [`UNKNOWN_ERROR_MESSAGE`]. When the value's type is known at the call
/// site, prefer [`error_message!`](crate::error_message!), which accepts
/// every error type.
pub fn error_message(value: &dyn Any) -> String {
    if let Some(err) = value.downcast_ref::<Error>() {
        return err.display_message();
    }
    if let Some(err) = value.downcast_ref::<reqwest::Error>() {
        return transport_message(err.to_string());
    }
    match known_error(value) {
        Some(err) => describe_error(err),
        None => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

fn known_error(value: &dyn Any) -> Option<&(dyn StdError + 'static)> {
    macro_rules! try_downcast {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(err) = value.downcast_ref::<$ty>() {
                    return Some(err);
                }
            )*
        };
    }

    if let Some(err) = value.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        return Some(err.as_ref());
    }
    if let Some(err) = value.downcast_ref::<Box<dyn StdError>>() {
        return Some(err.as_ref());
    }
    try_downcast!(
        std::io::Error,
        std::fmt::Error,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::num::TryFromIntError,
        std::str::ParseBoolError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        std::net::AddrParseError,
        serde_json::Error,
        url::ParseError,
        tokio::time::error::Elapsed,
        crate::session::ContextError,
    );
    None
}

/// Convert a value already known to be an error into a user-facing message.
///
/// Transport errors wrapped in a trait object are still recognized, so
/// `describe_error(anyhow_err.as_ref())` follows the same precedence as
/// [`error_message`].
pub fn describe_error(err: &(dyn StdError + 'static)) -> String {
    if let Some(err) = err.downcast_ref::<Error>() {
        return err.display_message();
    }
    if let Some(err) = err.downcast_ref::<reqwest::Error>() {
        return transport_message(err.to_string());
    }
    let message = err.to_string();
    if message.is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

fn transport_message(message: String) -> String {
    if message.is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Convert any caught value into a user-facing message.
///
/// Unlike the [`error_message`] function this sees the value's static
/// type, so every `std::error::Error` implementor is treated as
/// error-like while strings, numbers, unit and other plain values still map
/// to [`UNKNOWN_ERROR_MESSAGE`].
///
/// ```
/// use iphop_client::UNKNOWN_ERROR_MESSAGE;
///
/// let err = "x".parse::<i32>().unwrap_err();
/// assert_eq!(iphop_client::error_message!(err), "invalid digit found in string");
/// assert_eq!(iphop_client::error_message!("oops"), UNKNOWN_ERROR_MESSAGE);
/// ```
#[macro_export]
macro_rules! error_message {
    ($value:expr $(,)?) => {
        match &$value {
            value => {
                #[allow(unused_imports)]
                use $crate::error::__private::{ErrorKind as _, OtherKind as _};
                (&value).caught_kind().message(value)
            }
        }
    };
}

// Method resolution picks `ErrorKind` when the value implements
// `std::error::Error` and falls back to the autoref'd `OtherKind`.
#[doc(hidden)]
pub mod __private {
    use std::any::Any;
    use std::error::Error as StdError;

    pub struct ErrorTag;

    pub struct OtherTag;

    pub trait ErrorKind {
        #[inline]
        fn caught_kind(&self) -> ErrorTag {
            ErrorTag
        }
    }

    impl<E: StdError + 'static> ErrorKind for &E {}

    pub trait OtherKind {
        #[inline]
        fn caught_kind(&self) -> OtherTag {
            OtherTag
        }
    }

    impl<T: Any> OtherKind for &&T {}

    impl ErrorTag {
        pub fn message<E: StdError + 'static>(self, err: &E) -> String {
            super::describe_error(err)
        }
    }

    impl OtherTag {
        pub fn message<T: Any>(self, value: &T) -> String {
            super::error_message(value)
        }
    }
}
