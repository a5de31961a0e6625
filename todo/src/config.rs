//! Runtime configuration for the todo store.
//!
//! Values come from defaults, then environment variables, then builder
//! overrides:
//!
//! | Variable                  | Default | Meaning                              |
//! |---------------------------|---------|--------------------------------------|
//! | `TODO_FETCH_DELAY_MS`     | `800`   | Simulated latency of the mock loader |
//! | `TODO_BROADCAST_CAPACITY` | `16`    | Buffered actions per subscriber      |
//!
//! # Example
//!
//! ```no_run
//! use todo_store::TodoConfig;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TodoConfig::from_env()?.with_fetch_delay(Duration::from_millis(50));
//! assert_eq!(config.fetch_delay, Duration::from_millis(50));
//! # Ok(())
//! # }
//! ```

use crate::error::ConfigError;
use crate::loader::DEFAULT_FETCH_DELAY;
use std::time::Duration;
use todo_store_runtime::DEFAULT_BROADCAST_CAPACITY;

/// Environment variable for the mock loader delay in milliseconds
pub const FETCH_DELAY_VAR: &str = "TODO_FETCH_DELAY_MS";

/// Environment variable for the action broadcast capacity
pub const BROADCAST_CAPACITY_VAR: &str = "TODO_BROADCAST_CAPACITY";

/// Configuration for a [`TodoStore`](crate::TodoStore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// Latency of the mock loader
    pub fetch_delay: Duration,
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            fetch_delay: DEFAULT_FETCH_DELAY,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl TodoConfig {
    /// Load from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but unparsable or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but unparsable or out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FETCH_DELAY_VAR) {
            let millis = parse_var::<u64>(FETCH_DELAY_VAR, &raw)?;
            config.fetch_delay = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(BROADCAST_CAPACITY_VAR) {
            config.broadcast_capacity = parse_var(BROADCAST_CAPACITY_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `broadcast_capacity` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Validation(
                "broadcast_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the mock loader delay
    #[must_use]
    pub const fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}
