//! Client configuration options.

use std::time::Duration;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Options for configuring the QuickClip client.
///
/// # Example
///
/// ```rust
/// use quickclip_client::QuickClipClientOptions;
/// use std::time::Duration;
///
/// let options = QuickClipClientOptions::new("http://localhost:8000")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct QuickClipClientOptions {
    /// The server base URL (e.g., "http://localhost:8000")
    pub url: String,

    /// Per-request timeout (default: 10 seconds)
    pub timeout: Duration,
}

impl QuickClipClientOptions {
    /// Create new options with the given server URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create options from environment variables.
    ///
    /// Reads `QUICKCLIP_SERVER_URL` (defaults to "http://127.0.0.1:8000").
    pub fn from_env() -> Self {
        let url = std::env::var("QUICKCLIP_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(url)
    }

    /// Base URL without trailing slashes
    pub(crate) fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Default for QuickClipClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = QuickClipClientOptions::default();
        assert_eq!(options.url, DEFAULT_SERVER_URL);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_base_url_strips_trailing_slashes() {
        let options = QuickClipClientOptions::new("http://example.com:8000//");
        assert_eq!(options.base_url(), "http://example.com:8000");
    }

    #[test]
    fn test_with_timeout() {
        let options =
            QuickClipClientOptions::new("http://x").with_timeout(Duration::from_millis(250));
        assert_eq!(options.timeout, Duration::from_millis(250));
    }
}
