//! Server configuration from `QUICKCLIP_*` environment variables.
//!
//! Unset or unparseable variables fall back to their defaults.

use anyhow::Context;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment; production turns on HSTS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Testing => "testing",
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "testing" | "test" => Ok(Environment::Testing),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Bounds applied to incoming clips before they reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipLimits {
    /// Maximum text length in characters
    pub max_text_length: usize,
    /// Shortest allowed timer in seconds
    pub min_timer: u64,
    /// Longest allowed timer in seconds
    pub max_timer: u64,
}

impl Default for ClipLimits {
    fn default() -> Self {
        Self {
            max_text_length: 100_000,
            min_timer: 30,
            max_timer: 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cleanup_interval: Duration,
    pub limits: ClipLimits,
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cleanup_interval: Duration::from_secs(60),
            limits: ClipLimits::default(),
            environment: Environment::default(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// - `QUICKCLIP_HOST` (default `127.0.0.1`)
    /// - `QUICKCLIP_PORT` (default `8000`)
    /// - `QUICKCLIP_CLEANUP_INTERVAL` seconds (default `60`)
    /// - `QUICKCLIP_MAX_TEXT_LENGTH` characters (default `100000`)
    /// - `QUICKCLIP_MIN_TIMER` / `QUICKCLIP_MAX_TIMER` seconds (default `30` / `600`)
    /// - `QUICKCLIP_ENVIRONMENT` `development|production|testing`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let min_timer = parse_or(&lookup, "QUICKCLIP_MIN_TIMER", defaults.limits.min_timer).max(1);
        let mut max_timer = parse_or(&lookup, "QUICKCLIP_MAX_TIMER", defaults.limits.max_timer);
        if max_timer < min_timer {
            tracing::warn!(
                "QUICKCLIP_MAX_TIMER ({}) is below QUICKCLIP_MIN_TIMER ({}), using {}",
                max_timer,
                min_timer,
                min_timer
            );
            max_timer = min_timer;
        }

        let cleanup_secs = parse_or(
            &lookup,
            "QUICKCLIP_CLEANUP_INTERVAL",
            defaults.cleanup_interval.as_secs(),
        );

        Self {
            host: lookup("QUICKCLIP_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "QUICKCLIP_PORT", defaults.port),
            cleanup_interval: Duration::from_secs(cleanup_secs.max(1)),
            limits: ClipLimits {
                max_text_length: parse_or(
                    &lookup,
                    "QUICKCLIP_MAX_TEXT_LENGTH",
                    defaults.limits.max_text_length,
                ),
                min_timer,
                max_timer,
            },
            environment: parse_or(&lookup, "QUICKCLIP_ENVIRONMENT", defaults.environment),
        }
    }

    /// Socket address to listen on
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.limits, ClipLimits::default());
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = config_from(&[
            ("QUICKCLIP_HOST", "0.0.0.0"),
            ("QUICKCLIP_PORT", "9000"),
            ("QUICKCLIP_CLEANUP_INTERVAL", "15"),
            ("QUICKCLIP_MAX_TEXT_LENGTH", "500"),
            ("QUICKCLIP_MIN_TIMER", "1"),
            ("QUICKCLIP_MAX_TIMER", "120"),
            ("QUICKCLIP_ENVIRONMENT", "Production"),
        ]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.cleanup_interval, Duration::from_secs(15));
        assert_eq!(
            config.limits,
            ClipLimits {
                max_text_length: 500,
                min_timer: 1,
                max_timer: 120,
            }
        );
        assert!(config.environment.is_production());
        assert_eq!(config.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[
            ("QUICKCLIP_PORT", "not-a-port"),
            ("QUICKCLIP_MIN_TIMER", "-3"),
            ("QUICKCLIP_ENVIRONMENT", "staging"),
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.limits.min_timer, 30);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_max_timer_raised_to_min() {
        let config = config_from(&[("QUICKCLIP_MIN_TIMER", "100"), ("QUICKCLIP_MAX_TIMER", "50")]);
        assert_eq!(config.limits.min_timer, 100);
        assert_eq!(config.limits.max_timer, 100);
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let config = config_from(&[("QUICKCLIP_HOST", "not an address")]);
        let err = config.bind_addr().unwrap_err();
        assert!(err.to_string().contains("Invalid listen address"));
    }
}
