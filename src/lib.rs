//! # Async Object Pool
//!
//! Non-blocking object pool for expensive resources such as network
//! connections. Consumers never block: objects are delivered through
//! single-shot callbacks (or awaited with [`AsyncPool::get_async`]).
//!
//! ## Features
//!
//! - Bounded pool size with a refilled minimum
//! - Bounded FIFO waiter queue with O(1) cancellation of any pending request
//! - Creation limiter capping concurrent creations, with adaptive back-off
//! - LRU or MRU reuse of idle objects
//! - Reaping of objects idle longer than a configured timeout
//! - Graceful shutdown once every object has been returned
//! - Point-in-time statistics
//!
//! ## Quick Start
//!
//! ```rust
//! use async_objectpool::{AsyncLifecycle, AsyncPool, PoolConfiguration, PoolResult, TokioLifecycle};
//!
//! struct Sessions;
//!
//! #[async_trait::async_trait]
//! impl AsyncLifecycle<u64> for Sessions {
//!     async fn create(&self) -> PoolResult<u64> {
//!         Ok(42)
//!     }
//!
//!     async fn destroy(&self, _session: u64, _error: bool) -> PoolResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let lifecycle = TokioLifecycle::new(Sessions, tokio::runtime::Handle::current());
//! let pool = AsyncPool::new("sessions", PoolConfiguration::new().with_max_size(4), lifecycle).unwrap();
//! pool.start().unwrap();
//!
//! {
//!     let session = pool.get_async().await.unwrap();
//!     assert_eq!(*session, 42);
//!     // Returned to the pool when `session` goes out of scope
//! }
//!
//! pool.shutdown_async().await.unwrap();
//! # }
//! ```

mod callback;
mod config;
mod deque;
mod errors;
mod eviction;
mod lifecycle;
mod limiter;
mod pool;
mod stats;

pub use callback::{
    BoxCallback, Callback, FutureCallback, MultiCallback, Pending, blocking, count_down, empty,
};
pub use config::{LimiterConfiguration, PoolConfiguration};
pub use deque::{Iter, LinkedDeque, NodeHandle};
pub use errors::{PoolError, PoolResult};
pub use eviction::EvictionPolicy;
pub use lifecycle::{AsyncLifecycle, Lifecycle, TokioLifecycle};
pub use limiter::{CreateLimiter, CreateTask, DoneCallback, NoopCreateLimiter, SimpleCreateLimiter};
pub use pool::{AsyncPool, Cancellable, PoolState, PooledObject, shutdown_all};
pub use stats::PoolStats;
