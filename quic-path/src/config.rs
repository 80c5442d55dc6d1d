use thiserror::Error;

use crate::{DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT};

/// Parameters governing the path validation state machine
///
/// The defaults send one challenge and up to three retransmissions before giving up on a path,
/// which matches common QUIC practice.
#[derive(Debug, Clone)]
pub struct PathValidatorConfig {
    pub(crate) max_retries: u32,
}

impl PathValidatorConfig {
    /// Maximum number of retransmitted PATH_CHALLENGE frames before validation fails
    ///
    /// Each expiry of the retry timer sends a new challenge until this many retries have been
    /// issued; the next expiry abandons the path. Must not exceed 16. Defaults to 3.
    pub fn max_retries(&mut self, value: u32) -> Result<&mut Self, ConfigError> {
        if value > MAX_RETRIES_LIMIT {
            return Err(ConfigError::OutOfBounds);
        }
        self.max_retries = value;
        Ok(self)
    }

    /// Upper bound on the number of challenges pending within a single attempt
    pub(crate) fn max_challenges(&self) -> usize {
        self.max_retries as usize + 1
    }
}

impl Default for PathValidatorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Errors in the configuration of a path validator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Value exceeds supported bounds
    #[error("value exceeds supported bounds")]
    OutOfBounds,
}
