//! Backoff policies.
//!
//! `Backoff` is the single delay abstraction used by both the retry executor
//! and the workflow engine. `RetryStrategy` grows the delay exponentially up
//! to a cap; `LinearBackoff` grows it by a fixed unit per attempt.

use super::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// Delay policy between attempts.
pub trait Backoff: Debug + Send + Sync {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    fn delay_after(&self, attempt: usize) -> Duration;
}

/// Exponential backoff with a bounded number of attempts.
///
/// # Example
///
/// ```rust
/// use waypoint::retry::RetryStrategy;
/// use std::time::Duration;
///
/// let strategy = RetryStrategy::new(
///     4,
///     Duration::from_millis(100),
///     Duration::from_millis(300),
///     2.0,
/// )
/// .unwrap();
///
/// let delays: Vec<_> = strategy.delays().collect();
/// assert_eq!(
///     delays,
///     vec![
///         Duration::from_millis(100),
///         Duration::from_millis(200),
///         Duration::from_millis(300),
///     ]
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryStrategy {
    /// Total attempts including the first one
    pub max_attempts: usize,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor applied after each delay
    pub multiplier: f64,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryStrategy {
    /// Create a validated strategy.
    pub fn new(
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Result<Self, StrategyError> {
        let strategy = Self {
            max_attempts,
            initial_delay,
            max_delay,
            multiplier,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Start from the defaults and override individual fields.
    pub fn builder() -> RetryStrategyBuilder {
        RetryStrategyBuilder::default()
    }

    /// A strategy that runs the operation exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.max_attempts == 0 {
            return Err(StrategyError::ZeroAttempts);
        }
        if self.max_delay < self.initial_delay {
            return Err(StrategyError::MaxBelowInitial {
                initial: self.initial_delay,
                max: self.max_delay,
            });
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(StrategyError::InvalidMultiplier(self.multiplier));
        }
        Ok(())
    }

    /// The delays slept between consecutive attempts, in order.
    ///
    /// Yields `max_attempts - 1` values.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(move |attempt| self.delay_after(attempt))
    }
}

/// Fluent construction of a [`RetryStrategy`], validated on `build()`.
#[derive(Clone, Debug, Default)]
pub struct RetryStrategyBuilder {
    strategy: RetryStrategy,
}

impl RetryStrategyBuilder {
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.strategy.max_attempts = attempts;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.strategy.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.strategy.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.strategy.multiplier = multiplier;
        self
    }

    pub fn build(self) -> Result<RetryStrategy, StrategyError> {
        self.strategy.validate()?;
        Ok(self.strategy)
    }
}

impl Backoff for RetryStrategy {
    fn delay_after(&self, attempt: usize) -> Duration {
        let cap = self.max_delay.as_nanos();
        let mut nanos = self.initial_delay.as_nanos().min(cap);
        for _ in 1..attempt {
            if nanos >= cap {
                break;
            }
            let grown = (nanos as f64 * self.multiplier).round();
            nanos = if grown.is_finite() && grown < cap as f64 {
                grown as u128
            } else {
                cap
            };
        }
        nanos_to_duration(nanos)
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = (nanos / 1_000_000_000) as u64;
    let subsec = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, subsec)
}

/// Linear backoff: after attempt `n` wait `n * unit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearBackoff {
    pub unit: Duration,
}

impl LinearBackoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Backoff for LinearBackoff {
    fn delay_after(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.unit.saturating_mul(factor)
    }
}
