use axum::extract::{Request, State};
use axum::http::header::{
    HeaderName, HeaderValue, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::middleware::Next;
use axum::response::Response;
use quickclip_core::redact_code;
use std::borrow::Cow;
use std::time::Instant;

use crate::service::AppState;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Adds browser hardening headers to every response. HSTS only in production.
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        PERMISSIONS_POLICY,
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
    if state.environment.is_production() {
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

/// Logs method, path, status and latency of each request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = loggable_path(request.uri().path()).into_owned();

    let response = next.run(request).await;

    tracing::info!(
        "{} {} - {} - {:.2}ms",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}

/// Masks the clip code in `/api/clips/{code}` paths.
fn loggable_path(path: &str) -> Cow<'_, str> {
    match path.strip_prefix("/api/clips/") {
        Some(code) if !code.is_empty() => Cow::Owned(format!("/api/clips/{}", redact_code(code))),
        _ => Cow::Borrowed(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_path_masks_codes() {
        assert_eq!(loggable_path("/api/clips/ABC234"), "/api/clips/AB****");
        assert_eq!(loggable_path("/api/clips/"), "/api/clips/");
        assert_eq!(loggable_path("/api/clips"), "/api/clips");
        assert_eq!(loggable_path("/health"), "/health");
    }
}
