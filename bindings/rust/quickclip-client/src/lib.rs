//! # QuickClip Client
//!
//! A high-level Rust client for the QuickClip HTTP service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quickclip_client::QuickClipClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quickclip_client::Error> {
//!     // Connect to the server (probes /health)
//!     let client = QuickClipClient::connect("http://localhost:8000").await?;
//!
//!     // Share some text for 5 minutes
//!     let created = client.create("meet at 5", 300).await?;
//!     println!("code: {}", created.code);
//!
//!     // Redeem it
//!     if let Some(clip) = client.get(&created.code).await? {
//!         println!("{} ({}s left)", clip.text, clip.remaining_seconds);
//!     }
//!
//!     // Remove it early
//!     client.delete(&created.code).await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod options;

pub use error::Error;
pub use options::{QuickClipClientOptions, DEFAULT_SERVER_URL};

use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Response to a successful create
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedClip {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub timer: u64,
    pub message: String,
}

/// A clip as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ClipData {
    pub code: String,
    pub text: String,
    pub expires_at: DateTime<Utc>,
    pub remaining_seconds: u64,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    text: &'a str,
    timer: u64,
}

/// A client for the QuickClip service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct QuickClipClient {
    http: reqwest::Client,
    base: Url,
}

impl QuickClipClient {
    /// Connect to a QuickClip server.
    ///
    /// Fails with [`Error::Connection`] if the server's health check does
    /// not answer.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        Self::with_options(QuickClipClientOptions::new(url)).await
    }

    /// Connect to a QuickClip server with custom options.
    pub async fn with_options(options: QuickClipClientOptions) -> Result<Self, Error> {
        let base = Url::parse(&format!("{}/", options.base_url()))
            .map_err(|e| Error::Connection(format!("Invalid server URL '{}': {e}", options.url)))?;
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        let client = Self { http, base };
        if !client.health().await {
            return Err(Error::Connection(format!(
                "Server at {} did not pass its health check",
                options.url
            )));
        }

        Ok(client)
    }

    /// Share `text` for `timer` seconds.
    ///
    /// The server rejects empty text and timers outside its configured range
    /// with [`Error::InvalidInput`].
    pub async fn create(&self, text: impl AsRef<str>, timer: u64) -> Result<CreatedClip, Error> {
        let url = self.endpoint("api/clips/")?;
        let response = self
            .http
            .post(url)
            .json(&CreateRequest {
                text: text.as_ref(),
                timer,
            })
            .send()
            .await
            .map_err(transport)?;

        Ok(check(response).await?.json().await?)
    }

    /// Retrieve a clip. The code is case-insensitive.
    ///
    /// Returns `None` if the clip doesn't exist or has expired. Reading does
    /// not consume the clip.
    pub async fn get(&self, code: &str) -> Result<Option<ClipData>, Error> {
        let response = self
            .http
            .get(self.clip_url(code)?)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    /// Delete a clip. Succeeds whether or not it existed.
    pub async fn delete(&self, code: &str) -> Result<(), Error> {
        let response = self
            .http
            .delete(self.clip_url(code)?)
            .send()
            .await
            .map_err(transport)?;

        check(response).await?;
        Ok(())
    }

    /// Returns `true` if the server answers its health check.
    pub async fn health(&self) -> bool {
        let Ok(url) = self.endpoint("health") else {
            return false;
        };
        match self.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base
            .join(path)
            .map_err(|e| Error::Connection(format!("Invalid endpoint '{path}': {e}")))
    }

    fn clip_url(&self, code: &str) -> Result<Url, Error> {
        let mut url = self.endpoint("api/clips/")?;
        url.path_segments_mut()
            .map_err(|_| Error::Connection(format!("Server URL '{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .push(&code.trim().to_uppercase());
        Ok(url)
    }
}

/// Passes success responses through, turns the rest into [`Error`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::from_response(status, &body))
}

fn transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() {
        Error::Connection(err.to_string())
    } else {
        Error::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client(url: &str) -> QuickClipClient {
        QuickClipClient {
            http: reqwest::Client::new(),
            base: Url::parse(url).unwrap(),
        }
    }

    #[test]
    fn test_clip_url_uppercases_and_escapes() {
        let client = offline_client("http://localhost:8000/");

        assert_eq!(
            client.clip_url(" abc234 ").unwrap().as_str(),
            "http://localhost:8000/api/clips/ABC234"
        );
        assert_eq!(
            client.clip_url("A/B?C").unwrap().as_str(),
            "http://localhost:8000/api/clips/A%2FB%3FC"
        );
    }

    #[test]
    fn test_endpoint_respects_base_path() {
        let client = offline_client("http://example.com/quickclip/");
        assert_eq!(
            client.endpoint("api/clips/").unwrap().as_str(),
            "http://example.com/quickclip/api/clips/"
        );
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        let options = QuickClipClientOptions::new("http://127.0.0.1:1")
            .with_timeout(std::time::Duration::from_millis(500));
        let err = QuickClipClient::with_options(options).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let err = QuickClipClient::connect("not a url").await.unwrap_err();
        assert!(matches!(err, Error::Connection(ref msg) if msg.contains("Invalid server URL")));
    }
}
