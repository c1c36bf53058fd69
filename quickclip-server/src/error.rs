use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quickclip_core::StoreError;

use crate::types::ErrorResponse;

/// Errors returned by the HTTP handlers, rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum AppError {
    /// Rejected before reaching the store (400)
    InvalidInput(String),
    /// Unknown or expired code (404)
    NotFound(String),
    /// No free code could be drawn (503)
    StoreExhausted(String),
    /// Body could not be decoded; keeps the extractor's status (400/413/415/422)
    Rejected { status: StatusCode, detail: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::StoreExhausted(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Rejected { status, detail } => (status, detail),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Exhausted { attempts } => {
                tracing::warn!("Code space exhausted after {} attempts", attempts);
                AppError::StoreExhausted(
                    "Could not allocate a clip code, please try again".to_string(),
                )
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}
