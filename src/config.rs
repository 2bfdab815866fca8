//! Pool configuration options

use crate::errors::{PoolError, PoolResult};
use crate::eviction::EvictionPolicy;
use std::time::Duration;

/// Configuration for the creation limiter that throttles object construction
///
/// # Examples
///
/// ```
/// use async_objectpool::LimiterConfiguration;
/// use std::time::Duration;
///
/// let limiter = LimiterConfiguration::new()
///     .with_max_concurrent_creations(2)
///     .with_period_bounds(Duration::ZERO, Duration::from_millis(500));
///
/// assert_eq!(limiter.max_concurrent_creations, 2);
/// assert_eq!(limiter.max_period, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterConfiguration {
    /// Lower bound for the delay between two creation dispatches
    pub min_period: Duration,

    /// Upper bound for the delay between two creation dispatches
    pub max_period: Duration,

    /// Maximum number of creations running at the same time
    pub max_concurrent_creations: usize,

    /// First back-off step taken when the period is raised from zero
    pub initial_backoff: Duration,
}

impl Default for LimiterConfiguration {
    fn default() -> Self {
        Self {
            min_period: Duration::ZERO,
            max_period: Duration::from_secs(1),
            max_concurrent_creations: 8,
            initial_backoff: Duration::from_millis(10),
        }
    }
}

impl LimiterConfiguration {
    /// Create a new limiter configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds the period is clamped into
    pub fn with_period_bounds(mut self, min: Duration, max: Duration) -> Self {
        self.min_period = min;
        self.max_period = max;
        self
    }

    /// Set the maximum number of concurrently running creations
    pub fn with_max_concurrent_creations(mut self, count: usize) -> Self {
        self.max_concurrent_creations = count;
        self
    }

    /// Set the first back-off step
    pub fn with_initial_backoff(mut self, step: Duration) -> Self {
        self.initial_backoff = step;
        self
    }

    pub fn validate(&self) -> PoolResult<()> {
        if self.max_concurrent_creations == 0 {
            return Err(PoolError::InvalidConfiguration(
                "max_concurrent_creations must be at least 1".to_string(),
            ));
        }
        if self.min_period > self.max_period {
            return Err(PoolError::InvalidConfiguration(format!(
                "min_period {:?} exceeds max_period {:?}",
                self.min_period, self.max_period
            )));
        }
        Ok(())
    }
}

/// Configuration for pool behavior
///
/// Supplied at construction and not mutable afterwards.
///
/// # Examples
///
/// ```
/// use async_objectpool::{EvictionPolicy, PoolConfiguration};
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_size(10)
///     .with_min_size(2)
///     .with_max_waiters(100)
///     .with_idle_timeout(Duration::from_secs(30))
///     .with_eviction_policy(EvictionPolicy::Mru);
///
/// assert_eq!(config.max_size, 10);
/// assert_eq!(config.idle_timeout, Some(Duration::from_secs(30)));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfiguration {
    /// Maximum number of objects the pool may own, including creations in flight
    pub max_size: usize,

    /// Number of objects the pool keeps alive while running
    pub min_size: usize,

    /// Maximum number of pending `get` requests
    pub max_waiters: usize,

    /// Idle objects older than this are reaped. `None` disables reaping.
    pub idle_timeout: Option<Duration>,

    /// Which idle object is handed out first
    pub eviction_policy: EvictionPolicy,

    /// Creation throttling
    pub limiter: LimiterConfiguration,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_size: 100,
            min_size: 0,
            max_waiters: usize::MAX,
            idle_timeout: None,
            eviction_policy: EvictionPolicy::Lru,
            limiter: LimiterConfiguration::default(),
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum pool size
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the minimum pool size
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Set the maximum number of waiters
    pub fn with_max_waiters(mut self, count: usize) -> Self {
        self.max_waiters = count;
        self
    }

    /// Set the idle timeout for objects
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Set the eviction policy
    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Set the creation limiter configuration
    pub fn with_limiter(mut self, limiter: LimiterConfiguration) -> Self {
        self.limiter = limiter;
        self
    }

    /// Check the configuration for contradictions
    ///
    /// # Examples
    ///
    /// ```
    /// use async_objectpool::{PoolConfiguration, PoolError};
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_max_size(2)
    ///     .with_min_size(3);
    ///
    /// assert!(matches!(config.validate(), Err(PoolError::InvalidConfiguration(_))));
    /// ```
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidConfiguration(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(PoolError::InvalidConfiguration(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        self.limiter.validate()
    }

    /// How often the reaper runs, if reaping is enabled
    pub(crate) fn reap_interval(&self) -> Option<Duration> {
        self.idle_timeout
            .filter(|timeout| !timeout.is_zero())
            .map(|timeout| timeout.min(Duration::from_secs(1)))
    }
}
