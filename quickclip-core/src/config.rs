use std::time::Duration;

/// Default number of codes drawn before `create` gives up
pub const DEFAULT_MAX_CODE_ATTEMPTS: usize = 16;

/// Shortest sweep interval a store will run with
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a [`Store`](crate::Store)
///
/// # Example
///
/// ```rust
/// use quickclip_core::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_cleanup_interval(Duration::from_secs(30))
///     .with_max_code_attempts(8);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between full sweeps of the store (default: 60 seconds).
    ///
    /// Entries are normally evicted at their exact deadline; the full sweep
    /// only catches whatever the deadline schedule missed.
    pub cleanup_interval: Duration,
    /// How many random codes `create` draws before failing with
    /// [`StoreError::Exhausted`](crate::StoreError::Exhausted) (default: 16)
    pub max_code_attempts: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interval of the full expiry sweep
    ///
    /// Values below [`MIN_CLEANUP_INTERVAL`] are raised to it.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval.max(MIN_CLEANUP_INTERVAL);
        self
    }

    /// Sets the collision retry budget for code generation
    ///
    /// Values below 1 are raised to 1; `create` always draws at least once.
    pub fn with_max_code_attempts(mut self, attempts: usize) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }
}
