use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use chrono::Utc;
use quickclip_core::{redact_code, Store, CODE_LENGTH};

use crate::config::{ClipLimits, Environment};
use crate::error::AppError;
use crate::middleware::{log_requests, security_headers};
use crate::types::{
    ClipData, CreateClipRequest, CreateClipResponse, HealthResponse, MessageResponse,
    RootResponse,
};

/// Smallest request body limit (1 MB)
const MIN_BODY_LIMIT: usize = 1024 * 1024;

/// Worst-case JSON bytes per text character (`\uXXXX` escapes)
const JSON_BYTES_PER_CHAR: usize = 6;

/// Room for the rest of the create body
const BODY_OVERHEAD: usize = 4 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub limits: ClipLimits,
    pub environment: Environment,
}

impl AppState {
    pub fn new(store: Store, limits: ClipLimits, environment: Environment) -> Self {
        Self {
            store,
            limits,
            environment,
        }
    }
}

/// Builds the HTTP API
///
/// - `GET /` - Service info
/// - `GET /health` - Liveness probe
/// - `POST /api/clips/` - Create a clip
/// - `GET /api/clips/{code}` - Read a clip
/// - `DELETE /api/clips/{code}` - Delete a clip
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/clips", post(create_clip))
        .route("/api/clips/", post(create_clip))
        .route("/api/clips/{code}", get(get_clip).delete(delete_clip))
        .layer(DefaultBodyLimit::max(body_limit(&state.limits)))
        .layer(middleware::from_fn_with_state(state.clone(), security_headers))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Body limit large enough that any text within `max_text_length` fits, so
/// oversized text gets the length error rather than a 413.
fn body_limit(limits: &ClipLimits) -> usize {
    limits
        .max_text_length
        .saturating_mul(JSON_BYTES_PER_CHAR)
        .saturating_add(BODY_OVERHEAD)
        .max(MIN_BODY_LIMIT)
}

/// Strips control characters other than newline and tab, then trims.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || c == '\t' || (c >= ' ' && c != '\u{7f}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Validates and sanitizes clip text, returning what will be stored
fn validate_text(text: &str, limits: &ClipLimits) -> Result<String, AppError> {
    if text.chars().count() > limits.max_text_length {
        return Err(AppError::InvalidInput(format!(
            "Text exceeds maximum length of {} characters",
            limits.max_text_length
        )));
    }
    let sanitized = sanitize_text(text);
    if sanitized.is_empty() {
        return Err(AppError::InvalidInput("Text cannot be empty".to_string()));
    }
    Ok(sanitized)
}

fn validate_timer(timer: i64, limits: &ClipLimits) -> Result<u64, AppError> {
    match u64::try_from(timer) {
        Ok(secs) if (limits.min_timer..=limits.max_timer).contains(&secs) => Ok(secs),
        _ => Err(AppError::InvalidInput(format!(
            "Timer must be between {} and {} seconds",
            limits.min_timer, limits.max_timer
        ))),
    }
}

fn validate_code(code: &str) -> Result<(), AppError> {
    if code.chars().count() != CODE_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Code must be {CODE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// GET / - Service info
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: "QuickClip API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health: "/health".to_string(),
        environment: state.environment.as_str().to_string(),
    })
}

/// GET /health - Liveness probe; never touches the store.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "QuickClip API is running".to_string(),
        timestamp: Utc::now(),
    })
}

/// POST /api/clips/ - Store text under a new code.
async fn create_clip(
    State(state): State<AppState>,
    payload: Result<Json<CreateClipRequest>, JsonRejection>,
) -> Result<Json<CreateClipResponse>, AppError> {
    let Json(req) = payload?;
    let text = validate_text(&req.text, &state.limits)?;
    let timer = validate_timer(req.timer, &state.limits)?;

    let entry = state.store.create(text, timer)?;
    tracing::debug!(
        "CREATE {} (ttl: {}s, {} bytes)",
        redact_code(entry.code()),
        timer,
        entry.text().len()
    );

    Ok(Json(CreateClipResponse::from(&entry)))
}

/// GET /api/clips/{code} - Read a clip without consuming it.
async fn get_clip(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ClipData>, AppError> {
    validate_code(&code)?;
    tracing::debug!("GET {}", redact_code(&code));

    let entry = state
        .store
        .get(&code)
        .ok_or_else(|| AppError::NotFound("Clip not found or expired".to_string()))?;

    Ok(Json(ClipData::from(&entry)))
}

/// DELETE /api/clips/{code} - Succeeds whether or not the clip existed.
async fn delete_clip(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_code(&code)?;

    let deleted = state.store.delete(&code);
    tracing::debug!("DELETE {} (existed: {})", redact_code(&code), deleted);

    Ok(Json(MessageResponse {
        message: "Clip deleted successfully".to_string(),
    }))
}
