//! # Table Wait Policy
//!
//! Bounds the wait for a freshly created table to become ACTIVE.
//!
//! The wait polls at a fixed interval and gives up once the deadline passes
//! or the optional attempt cap is reached, whichever comes first.
//!
//! ## Usage
//!
//! ```rust
//! use eden::state::WaitPolicy;
//! use std::time::Duration;
//!
//! let policy = WaitPolicy::new(Duration::from_millis(500), Duration::from_secs(1))
//!     .with_max_attempts(3);
//! let mut wait = policy.start();
//! assert_eq!(wait.next_delay(), Some(Duration::from_millis(500)));
//! ```

use std::time::Duration;
use tokio::time::Instant;

/// Fixed-interval wait with a deadline and an optional attempt cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    interval: Duration,
    timeout: Duration,
    max_attempts: Option<u32>,
}

impl WaitPolicy {
    #[must_use]
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            max_attempts: None,
        }
    }

    /// Cap the number of polls regardless of the deadline
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Begin a wait; the deadline is measured from now.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    #[must_use]
    pub fn start(&self) -> Wait {
        let started = Instant::now();
        Wait {
            policy: *self,
            started,
            deadline: started.checked_add(self.timeout),
            attempts: 0,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        use crate::constants::{DEFAULT_TABLE_POLL_INTERVAL_MS, DEFAULT_TABLE_WAIT_TIMEOUT_SECS};
        Self::new(
            Duration::from_millis(DEFAULT_TABLE_POLL_INTERVAL_MS),
            Duration::from_secs(DEFAULT_TABLE_WAIT_TIMEOUT_SECS),
        )
    }
}

/// An in-progress wait
#[derive(Debug)]
pub struct Wait {
    policy: WaitPolicy,
    started: Instant,
    deadline: Option<Instant>,
    attempts: u32,
}

impl Wait {
    /// Delay before the next poll, or `None` once the wait is over.
    ///
    /// The last delay is shortened so the final poll lands on the deadline.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_attempts {
            if self.attempts >= max {
                return None;
            }
        }

        let delay = match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return None;
                }
                self.policy.interval.min(remaining)
            }
            None => self.policy.interval,
        };

        self.attempts += 1;
        Some(delay)
    }

    /// Polls granted so far
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time spent since the wait started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
