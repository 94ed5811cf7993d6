use crate::core::{EngineError, Result};
use std::time::Duration;

/// Debounce window after the last submission before a commit fires.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 500;

/// Upper bound between the first submission in a cycle and the forced commit.
pub const DEFAULT_MAX_WAIT_MS: u64 = 2500;

/// Engine timing configuration.
///
/// `quiet_period` is the debounce window: every submission restarts the
/// countdown. `max_wait` is the ceiling: a steady stream of submissions
/// cannot postpone a commit past this bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub quiet_period: Duration,
    pub max_wait: Duration,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            quiet_period: Duration::from_millis(DEFAULT_QUIET_PERIOD_MS),
            max_wait: Duration::from_millis(DEFAULT_MAX_WAIT_MS),
        }
    }

    /// Set the debounce quiet period.
    pub fn quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Set the commit ceiling.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the quiet period is zero or exceeds the
    /// ceiling.
    pub fn validate(&self) -> Result<()> {
        if self.quiet_period.is_zero() {
            return Err(EngineError::InvalidConfig(
                "quiet_period must be > 0".to_string(),
            ));
        }

        if self.quiet_period > self.max_wait {
            return Err(EngineError::InvalidConfig(
                "quiet_period cannot exceed max_wait".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
