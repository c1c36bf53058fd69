//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use quickclip_core::ClipEntry;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/clips/`
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateClipRequest {
    pub text: String,
    /// Lifetime in seconds; signed so out-of-range values get a validation
    /// error instead of a decode error
    pub timer: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateClipResponse {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub timer: u64,
    pub message: String,
}

impl From<&ClipEntry> for CreateClipResponse {
    fn from(entry: &ClipEntry) -> Self {
        Self {
            code: entry.code().to_string(),
            expires_at: entry.expires_at(),
            timer: entry.ttl_seconds(),
            message: "Clip created successfully".to_string(),
        }
    }
}

/// Body of `GET /api/clips/{code}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ClipData {
    pub code: String,
    pub text: String,
    pub expires_at: DateTime<Utc>,
    pub remaining_seconds: u64,
}

impl From<&ClipEntry> for ClipData {
    fn from(entry: &ClipEntry) -> Self {
        Self {
            code: entry.code().to_string(),
            text: entry.text().to_string(),
            expires_at: entry.expires_at(),
            remaining_seconds: entry.remaining_seconds(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub health: String,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
