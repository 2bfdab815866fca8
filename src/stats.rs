//! Pool statistics

/// Point-in-time snapshot of a pool's counters and sizes
///
/// # Examples
///
/// ```
/// use async_objectpool::{AsyncPool, BoxCallback, Lifecycle, PoolConfiguration};
///
/// struct Numbers;
///
/// impl Lifecycle<u32> for Numbers {
///     fn create(&self, callback: BoxCallback<u32>) { callback.complete(Ok(1)) }
///     fn validate_get(&self, _: &u32) -> bool { true }
///     fn validate_put(&self, _: &u32) -> bool { true }
///     fn destroy(&self, _: u32, _: bool, callback: BoxCallback<()>) { callback.complete(Ok(())) }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let pool = AsyncPool::new("numbers", PoolConfiguration::new().with_min_size(2), Numbers).unwrap();
/// pool.start().unwrap();
///
/// let stats = pool.stats();
/// assert_eq!(stats.pool_name, "numbers");
/// assert_eq!(stats.total_created, 2);
/// assert_eq!(stats.idle_count, 2);
/// assert_eq!(stats.checked_out, 0);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolStats {
    pub pool_name: String,

    /// Configured maximum pool size
    pub max_size: usize,

    /// Configured minimum pool size
    pub min_size: usize,

    /// Objects owned by the pool: idle, checked out, being created or being destroyed
    pub pool_size: usize,

    /// Objects created successfully since start
    pub total_created: usize,

    /// Failed creations since start
    pub total_create_errors: usize,

    /// Objects destroyed since start, including reaped and disposed ones
    pub total_destroyed: usize,

    /// Failed destructions since start
    pub total_destroy_errors: usize,

    /// Objects destroyed because they failed validation or were disposed
    pub total_bad_destroyed: usize,

    /// Idle objects reaped for exceeding the idle timeout
    pub total_timeout: usize,

    /// Objects currently checked out
    pub checked_out: usize,

    /// Objects currently idle
    pub idle_count: usize,

    /// Pending `get` requests
    pub waiters: usize,
}

/// Lifetime counters, mutated under the pool lock
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub total_created: usize,
    pub total_create_errors: usize,
    pub total_destroyed: usize,
    pub total_destroy_errors: usize,
    pub total_bad_destroyed: usize,
    pub total_timeout: usize,
}
