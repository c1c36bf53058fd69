//! Error types for the QuickClip client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when using the QuickClip client.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to reach the server
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP transport or body decoding error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request (bad text, timer or code)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The server could not allocate a code
    #[error("Store exhausted: {0}")]
    StoreExhausted(String),

    /// Any other non-success response
    #[error("Server returned {status}: {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The server's `detail` message, or the raw body
        detail: String,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl Error {
    /// Returns `true` if the server could not allocate a code.
    pub fn is_store_exhausted(&self) -> bool {
        matches!(self, Error::StoreExhausted(_))
    }

    /// Builds an error from a non-success status and its body, mapping 400
    /// to `InvalidInput` and 503 to `StoreExhausted`.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.detail)
            .unwrap_or_else(|_| body.to_string());

        match status {
            StatusCode::BAD_REQUEST => Error::InvalidInput(detail),
            StatusCode::SERVICE_UNAVAILABLE => Error::StoreExhausted(detail),
            _ => Error::Api {
                status: status.as_u16(),
                detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_invalid_input() {
        let err = Error::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Code must be 6 characters"}"#,
        );
        assert!(matches!(err, Error::InvalidInput(ref d) if d == "Code must be 6 characters"));
    }

    #[test]
    fn test_service_unavailable_maps_to_exhausted() {
        let err = Error::from_response(StatusCode::SERVICE_UNAVAILABLE, r#"{"detail":"full"}"#);
        assert!(err.is_store_exhausted());
    }

    #[test]
    fn test_not_found() {
        let err = Error::from_response(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Clip not found or expired"}"#,
        );
        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "Server returned 404: Clip not found or expired");
    }

    #[test]
    fn test_non_json_body_is_kept_verbatim() {
        let err = Error::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, Error::Api { status: 502, ref detail } if detail == "upstream down"));
    }
}
