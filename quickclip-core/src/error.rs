use thiserror::Error;

/// Error type for store operations
///
/// Lookups of absent or expired codes are not errors; they return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Every code drawn collided with a live clip
    #[error("no free code after {attempts} attempts")]
    Exhausted {
        /// Number of codes drawn before giving up
        attempts: usize,
    },
}

impl StoreError {
    /// Returns `true` if code generation ran out of attempts
    pub fn is_exhausted(&self) -> bool {
        matches!(self, StoreError::Exhausted { .. })
    }
}
