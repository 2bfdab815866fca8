//! Core asynchronous pool implementation
//!
//! All mutable pool state sits behind one lock. Every operation works out
//! what has to happen while holding it, releases it, and only then calls into
//! the lifecycle, the limiter or a consumer's callback. Callbacks may
//! therefore re-enter the pool freely.

use crate::callback::{BoxCallback, Callback, count_down};
use crate::config::PoolConfiguration;
use crate::deque::{LinkedDeque, NodeHandle};
use crate::errors::{PoolError, PoolResult};
use crate::eviction::IdleStore;
use crate::lifecycle::Lifecycle;
use crate::limiter::{CreateLimiter, CreateTask, DoneCallback, SimpleCreateLimiter};
use crate::stats::{Counters, PoolStats};

use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Lifecycle state of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    NotStarted,
    Running,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::NotStarted => "not started",
            PoolState::Running => "running",
            PoolState::ShuttingDown => "shutting down",
            PoolState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Withdraws a pending `get` request
///
/// Cancelling races against fulfilment: whichever happens first wins. A
/// request that was already fulfilled (or was never queued) is unaffected,
/// and [`cancel`](Self::cancel) reports `false`.
pub struct Cancellable {
    cancel: Option<Box<dyn FnOnce() -> bool + Send>>,
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellable")
            .field("queued", &self.cancel.is_some())
            .finish()
    }
}

impl Cancellable {
    fn noop() -> Self {
        Self { cancel: None }
    }

    /// Cancel the request. Returns `true` if the callback will never be invoked.
    pub fn cancel(self) -> bool {
        self.cancel.is_some_and(|cancel| cancel())
    }
}

struct Waiter<T> {
    callback: BoxCallback<T>,
    enqueued_at: Instant,
}

struct Shared<T> {
    state: PoolState,
    /// Idle + checked out + creations in flight + destructions in flight
    pool_size: usize,
    checked_out: usize,
    idle: IdleStore<T>,
    waiters: LinkedDeque<Waiter<T>>,
    shutdown_callback: Option<BoxCallback<()>>,
    reaper: Option<JoinHandle<()>>,
    counters: Counters,
}

struct PoolInner<T> {
    name: String,
    config: PoolConfiguration,
    lifecycle: Arc<dyn Lifecycle<T>>,
    limiter: Arc<dyn CreateLimiter>,
    runtime: Handle,
    shared: Mutex<Shared<T>>,
}

impl<T> Drop for PoolInner<T> {
    fn drop(&mut self) {
        if let Some(reaper) = self.shared.get_mut().reaper.take() {
            reaper.abort();
        }
    }
}

/// What to do once the lock is released after a shutdown check
struct Stopped<T> {
    callback: Option<BoxCallback<()>>,
    reaper: Option<JoinHandle<()>>,
    leftovers: Vec<T>,
}

/// Creation request handed to the limiter
///
/// Holds one unit of speculative `pool_size`. If the limiter drops it without
/// running it, that unit is given back.
struct CreateJob<T: Send + 'static> {
    pool: Weak<PoolInner<T>>,
    armed: bool,
}

impl<T: Send + 'static> CreateTask for CreateJob<T> {
    fn run(mut self: Box<Self>, done: DoneCallback) {
        self.armed = false;
        let Some(pool) = self.pool.upgrade() else {
            return;
        };
        let weak = Arc::downgrade(&pool);
        pool.lifecycle.create(Box::new(move |result: PoolResult<T>| {
            if let Some(pool) = weak.upgrade() {
                pool.on_created(result);
            }
            done.done();
        }));
    }
}

impl<T: Send + 'static> Drop for CreateJob<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(pool) = self.pool.upgrade() {
            pool.on_create_abandoned();
        }
    }
}

impl<T: Send + 'static> PoolInner<T> {
    /// Whether another creation should start. Reserves the slot in
    /// `pool_size` when it returns `true`.
    fn should_create(&self, shared: &mut Shared<T>) -> bool {
        if shared.state != PoolState::Running || shared.pool_size >= self.config.max_size {
            return false;
        }
        if !shared.waiters.is_empty() || shared.pool_size < self.config.min_size {
            shared.pool_size += 1;
            return true;
        }
        false
    }

    /// Submit a creation for a slot already reserved by `should_create`.
    /// Must not be called with the lock held.
    fn create(self: &Arc<Self>) {
        self.limiter.submit(Box::new(CreateJob {
            pool: Arc::downgrade(self),
            armed: true,
        }));
    }

    fn on_created(self: &Arc<Self>, result: PoolResult<T>) {
        match result {
            Ok(obj) => {
                self.shared.lock().counters.total_created += 1;
                self.add(obj);
            }
            Err(e) => {
                let (failed_waiter, retry) = {
                    let mut shared = self.shared.lock();
                    shared.counters.total_create_errors += 1;
                    shared.pool_size = shared.pool_size.saturating_sub(1);
                    let waiter = shared.waiters.poll_first();
                    (waiter, !shared.waiters.is_empty())
                };
                tracing::warn!(pool = %self.name, error = %e, "object creation failed");
                self.limiter.increment_period();

                if let Some(waiter) = failed_waiter {
                    waiter.callback.complete(Err(e));
                }
                // Only waiting demand is retried, and never on this stack: a
                // lifecycle failing synchronously would otherwise recurse. The
                // min_size floor is restored by the reaper or the next demand.
                if retry {
                    self.retry_for_waiters();
                }
                self.shutdown_if_needed();
            }
        }
    }

    fn retry_for_waiters(self: &Arc<Self>) {
        let pool = Arc::downgrade(self);
        self.runtime.spawn(async move {
            let Some(pool) = pool.upgrade() else {
                return;
            };
            let create = {
                let mut shared = pool.shared.lock();
                !shared.waiters.is_empty() && pool.should_create(&mut shared)
            };
            if create {
                pool.create();
            }
        });
    }

    /// Create up to the missing part of `min_size`, one attempt per slot
    fn refill_to_min(self: &Arc<Self>) {
        let deficit = {
            let shared = self.shared.lock();
            self.config.min_size.saturating_sub(shared.pool_size)
        };
        for _ in 0..deficit {
            let create = self.should_create(&mut self.shared.lock());
            if create {
                self.create();
            }
        }
    }

    fn on_create_abandoned(self: &Arc<Self>) {
        let create = {
            let mut shared = self.shared.lock();
            shared.pool_size = shared.pool_size.saturating_sub(1);
            self.should_create(&mut shared)
        };
        if create {
            self.create();
        }
        self.shutdown_if_needed();
    }

    /// Hand `obj` to the oldest waiter, or park it idle.
    fn add(self: &Arc<Self>, obj: T) {
        let waiter = {
            let mut shared = self.shared.lock();
            match shared.waiters.poll_first() {
                Some(waiter) => {
                    shared.checked_out += 1;
                    waiter
                }
                None => {
                    shared.idle.push(obj);
                    drop(shared);
                    self.shutdown_if_needed();
                    return;
                }
            }
        };

        tracing::trace!(
            pool = %self.name,
            waited = ?waiter.enqueued_at.elapsed(),
            "waiter fulfilled"
        );
        waiter.callback.complete(Ok(obj));
    }

    fn destroy(self: &Arc<Self>, obj: T, bad: bool) {
        if bad {
            self.limiter.increment_period();
            self.shared.lock().counters.total_bad_destroyed += 1;
        }

        let weak = Arc::downgrade(self);
        self.lifecycle.destroy(
            obj,
            bad,
            Box::new(move |result: PoolResult<()>| {
                if let Some(pool) = weak.upgrade() {
                    pool.on_destroyed(result);
                }
            }),
        );
    }

    fn on_destroyed(self: &Arc<Self>, result: PoolResult<()>) {
        let create = {
            let mut shared = self.shared.lock();
            match &result {
                Ok(()) => shared.counters.total_destroyed += 1,
                Err(_) => shared.counters.total_destroy_errors += 1,
            }
            shared.pool_size = shared.pool_size.saturating_sub(1);
            self.should_create(&mut shared)
        };
        if let Err(e) = result {
            tracing::warn!(pool = %self.name, error = %e, "object destruction failed");
        }
        if create {
            self.create();
        }
        self.shutdown_if_needed();
    }

    fn cancel_waiter(self: &Arc<Self>, handle: NodeHandle) -> bool {
        let removed = self.shared.lock().waiters.remove(handle);
        match removed {
            Some(waiter) => {
                tracing::trace!(
                    pool = %self.name,
                    waited = ?waiter.enqueued_at.elapsed(),
                    "waiter cancelled"
                );
                drop(waiter);
                self.shutdown_if_needed();
                true
            }
            None => false,
        }
    }

    fn shutdown_if_needed(self: &Arc<Self>) {
        let stopped = {
            let mut shared = self.shared.lock();
            if shared.state != PoolState::ShuttingDown
                || !shared.waiters.is_empty()
                || shared.idle.len() != shared.pool_size
            {
                return;
            }
            shared.state = PoolState::Stopped;
            Stopped {
                callback: shared.shutdown_callback.take(),
                reaper: shared.reaper.take(),
                leftovers: shared.idle.drain(),
            }
        };

        tracing::debug!(
            pool = %self.name,
            idle = stopped.leftovers.len(),
            "pool stopped"
        );
        if let Some(reaper) = stopped.reaper {
            reaper.abort();
        }
        for obj in stopped.leftovers {
            self.destroy(obj, false);
        }
        if let Some(callback) = stopped.callback {
            callback.complete(Ok(()));
        }
    }

    fn reap_idle(self: &Arc<Self>, timeout: Duration) {
        let expired = {
            let mut shared = self.shared.lock();
            let surplus = shared.pool_size.saturating_sub(self.config.min_size);
            let expired = shared.idle.reap_expired(timeout, surplus);
            shared.counters.total_timeout += expired.len();
            expired
        };

        if !expired.is_empty() {
            tracing::debug!(
                pool = %self.name,
                count = expired.len(),
                "disposing objects due to idle timeout"
            );
        }
        for obj in expired {
            self.destroy(obj, false);
        }
        self.refill_to_min();
    }

    fn spawn_reaper(self: &Arc<Self>, interval: Duration, timeout: Duration) -> JoinHandle<()> {
        let pool = Arc::downgrade(self);
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                match pool.upgrade() {
                    Some(pool) => pool.reap_idle(timeout),
                    None => break,
                }
            }
        })
    }
}

/// Non-blocking pool of expensive objects
///
/// Objects are created and destroyed through a [`Lifecycle`]; consumers
/// receive them through callbacks and hand them back with
/// [`put`](Self::put) or [`dispose`](Self::dispose). Cloning the pool is
/// cheap and yields another handle to the same pool.
///
/// A failed creation backs the limiter off just like a bad destroy does, and
/// fails the oldest waiter. It is retried only while other waiters remain; a
/// `min_size` shortfall is made up on the next reaper tick or the next demand.
///
/// # Examples
///
/// ```
/// use async_objectpool::{AsyncPool, BoxCallback, Lifecycle, PoolConfiguration, PoolResult};
///
/// struct Connections;
///
/// impl Lifecycle<String> for Connections {
///     fn create(&self, callback: BoxCallback<String>) {
///         callback.complete(Ok("connection".to_string()))
///     }
///     fn validate_get(&self, _: &String) -> bool { true }
///     fn validate_put(&self, _: &String) -> bool { true }
///     fn destroy(&self, _: String, _: bool, callback: BoxCallback<()>) {
///         callback.complete(Ok(()))
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let pool = AsyncPool::new("db", PoolConfiguration::new().with_max_size(4), Connections).unwrap();
/// pool.start().unwrap();
///
/// let handle = pool.clone();
/// pool.get(move |result: PoolResult<String>| {
///     let conn = result.unwrap();
///     handle.put(conn);
/// });
///
/// assert_eq!(pool.stats().idle_count, 1);
/// # }
/// ```
pub struct AsyncPool<T: Send + 'static> {
    inner: Arc<PoolInner<T>>,
}

impl<T: Send + 'static> Clone for AsyncPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for AsyncPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPool")
            .field("name", &self.inner.name)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T: Send + 'static> AsyncPool<T> {
    /// Create a pool on the current tokio runtime, throttled by a
    /// [`SimpleCreateLimiter`] built from `config.limiter`
    pub fn new<L>(
        name: impl Into<String>,
        config: PoolConfiguration,
        lifecycle: L,
    ) -> PoolResult<Self>
    where
        L: Lifecycle<T> + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| PoolError::RuntimeUnavailable)?;
        let limiter = Arc::new(SimpleCreateLimiter::new(config.limiter.clone(), runtime.clone()));
        Self::with_limiter(name, config, Arc::new(lifecycle), limiter, runtime)
    }

    /// Create a pool with an explicit limiter and runtime
    ///
    /// The limiter should belong to this pool alone: shutting down cancels
    /// whatever creations it still has queued.
    pub fn with_limiter(
        name: impl Into<String>,
        config: PoolConfiguration,
        lifecycle: Arc<dyn Lifecycle<T>>,
        limiter: Arc<dyn CreateLimiter>,
        runtime: Handle,
    ) -> PoolResult<Self> {
        config.validate()?;
        let idle = IdleStore::new(config.eviction_policy);
        Ok(Self {
            inner: Arc::new(PoolInner {
                name: name.into(),
                config,
                lifecycle,
                limiter,
                runtime,
                shared: Mutex::new(Shared {
                    state: PoolState::NotStarted,
                    pool_size: 0,
                    checked_out: 0,
                    idle,
                    waiters: LinkedDeque::new(),
                    shutdown_callback: None,
                    reaper: None,
                    counters: Counters::default(),
                }),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> PoolState {
        self.inner.shared.lock().state
    }

    /// Start the pool: begin reaping and create `min_size` objects
    pub fn start(&self) -> PoolResult<()> {
        let inner = &self.inner;
        {
            let mut shared = inner.shared.lock();
            if shared.state != PoolState::NotStarted {
                return Err(PoolError::NotRunning {
                    pool: inner.name.clone(),
                    state: shared.state,
                });
            }
            shared.state = PoolState::Running;
            if let (Some(interval), Some(timeout)) =
                (inner.config.reap_interval(), inner.config.idle_timeout)
            {
                shared.reaper = Some(inner.spawn_reaper(interval, timeout));
            }
        }
        tracing::debug!(
            pool = %inner.name,
            min_size = inner.config.min_size,
            max_size = inner.config.max_size,
            "pool started"
        );

        inner.refill_to_min();
        Ok(())
    }

    /// Request an object
    ///
    /// An idle object that passes validation is delivered synchronously on
    /// the calling thread. Otherwise the request waits in FIFO order for a
    /// returned or newly created object, and the returned [`Cancellable`] can
    /// withdraw it. Fails through the callback with
    /// [`PoolError::NotRunning`] unless the pool is running, or with
    /// [`PoolError::CapacityExceeded`] when the waiter queue is full.
    pub fn get<C>(&self, callback: C) -> Cancellable
    where
        C: Callback<T> + 'static,
    {
        let inner = &self.inner;
        let callback: BoxCallback<T> = Box::new(callback);
        loop {
            let obj = {
                let mut shared = inner.shared.lock();
                if shared.state != PoolState::Running {
                    let error = PoolError::NotRunning {
                        pool: inner.name.clone(),
                        state: shared.state,
                    };
                    drop(shared);
                    callback.complete(Err(error));
                    return Cancellable::noop();
                }

                match shared.idle.pop() {
                    Some(obj) => {
                        shared.checked_out += 1;
                        obj
                    }
                    None if shared.waiters.len() < inner.config.max_waiters => {
                        let handle = shared.waiters.add_last(Waiter {
                            callback,
                            enqueued_at: Instant::now(),
                        });
                        let create = inner.should_create(&mut shared);
                        drop(shared);

                        tracing::trace!(pool = %inner.name, create, "waiter enqueued");
                        if create {
                            inner.create();
                        }
                        let pool = Arc::downgrade(inner);
                        return Cancellable {
                            cancel: Some(Box::new(move || {
                                pool.upgrade()
                                    .is_some_and(|pool| pool.cancel_waiter(handle))
                            })),
                        };
                    }
                    None => {
                        drop(shared);
                        callback.complete(Err(PoolError::CapacityExceeded {
                            pool: inner.name.clone(),
                            max_waiters: inner.config.max_waiters,
                        }));
                        return Cancellable::noop();
                    }
                }
            };

            if inner.lifecycle.validate_get(&obj) {
                callback.complete(Ok(obj));
                return Cancellable::noop();
            }

            inner.shared.lock().checked_out -= 1;
            inner.destroy(obj, true);
        }
    }

    /// Request an object and await it
    ///
    /// Dropping the future withdraws the request. An object that arrives
    /// after the future is gone goes straight back into the pool.
    pub async fn get_async(&self) -> PoolResult<PooledObject<T>> {
        let (tx, rx) = oneshot::channel();
        let pool = Arc::downgrade(&self.inner);
        let token = self.get(move |result: PoolResult<T>| {
            if let Err(Ok(obj)) = tx.send(result)
                && let Some(inner) = pool.upgrade()
            {
                AsyncPool { inner }.put(obj);
            }
        });

        let mut checkout = PendingCheckout {
            token: Some(token),
            rx,
            pool: self.clone(),
        };
        let result = (&mut checkout.rx).await.unwrap_or(Err(PoolError::Cancelled));
        checkout.token = None;

        result.map(|obj| PooledObject::new(obj, self.clone()))
    }

    /// Like [`get_async`](Self::get_async), failing with
    /// [`PoolError::Timeout`] if no object arrives within `timeout`
    pub async fn get_timeout(&self, timeout: Duration) -> PoolResult<PooledObject<T>> {
        tokio::time::timeout(timeout, self.get_async())
            .await
            .map_err(|_| PoolError::Timeout(timeout))?
    }

    /// Return a checked-out object
    ///
    /// # Panics
    ///
    /// Panics if no object is checked out from this pool.
    pub fn put(&self, obj: T) {
        let inner = &self.inner;
        {
            let mut shared = inner.shared.lock();
            assert!(
                shared.checked_out > 0,
                "put on pool {} with no checked-out objects",
                inner.name
            );
            shared.checked_out -= 1;
        }

        if !inner.lifecycle.validate_put(&obj) {
            inner.destroy(obj, true);
            return;
        }
        inner.limiter.set_period(Duration::ZERO);
        inner.add(obj);
    }

    /// Discard a checked-out object that misbehaved
    ///
    /// # Panics
    ///
    /// Panics if no object is checked out from this pool.
    pub fn dispose(&self, obj: T) {
        let inner = &self.inner;
        {
            let mut shared = inner.shared.lock();
            assert!(
                shared.checked_out > 0,
                "dispose on pool {} with no checked-out objects",
                inner.name
            );
            shared.checked_out -= 1;
        }
        inner.destroy(obj, true);
    }

    /// Stop handing out objects and complete `callback` once every waiter is
    /// gone and every object has been returned
    ///
    /// Remaining idle objects are destroyed when the pool stops. Fails
    /// through the callback with [`PoolError::NotRunning`] unless the pool is
    /// running.
    pub fn shutdown<C>(&self, callback: C)
    where
        C: Callback<()> + 'static,
    {
        let inner = &self.inner;
        let callback: BoxCallback<()> = Box::new(callback);
        let no_waiters = {
            let mut shared = inner.shared.lock();
            if shared.state != PoolState::Running {
                let error = PoolError::NotRunning {
                    pool: inner.name.clone(),
                    state: shared.state,
                };
                drop(shared);
                callback.complete(Err(error));
                return;
            }
            shared.state = PoolState::ShuttingDown;
            shared.shutdown_callback = Some(callback);
            shared.waiters.is_empty()
        };
        tracing::debug!(pool = %inner.name, "pool shutting down");

        if no_waiters {
            // Each dropped job gives its reserved slot back.
            drop(inner.limiter.cancel_pending_tasks());
        }
        inner.shutdown_if_needed();
    }

    /// Shut down and await completion
    pub async fn shutdown_async(&self) -> PoolResult<()> {
        let (tx, rx) = oneshot::channel();
        self.shutdown(move |result: PoolResult<()>| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(PoolError::Cancelled))
    }

    pub fn stats(&self) -> PoolStats {
        let inner = &self.inner;
        let shared = inner.shared.lock();
        PoolStats {
            pool_name: inner.name.clone(),
            max_size: inner.config.max_size,
            min_size: inner.config.min_size,
            pool_size: shared.pool_size,
            total_created: shared.counters.total_created,
            total_create_errors: shared.counters.total_create_errors,
            total_destroyed: shared.counters.total_destroyed,
            total_destroy_errors: shared.counters.total_destroy_errors,
            total_bad_destroyed: shared.counters.total_bad_destroyed,
            total_timeout: shared.counters.total_timeout,
            checked_out: shared.checked_out,
            idle_count: shared.idle.len(),
            waiters: shared.waiters.len(),
        }
    }
}

/// A `get_async` call that has not resolved yet
///
/// Dropped early, it withdraws the waiter. If the waiter was already
/// fulfilled, the object is waiting in `rx` and goes back to the pool.
struct PendingCheckout<T: Send + 'static> {
    token: Option<Cancellable>,
    rx: oneshot::Receiver<PoolResult<T>>,
    pool: AsyncPool<T>,
}

impl<T: Send + 'static> Drop for PendingCheckout<T> {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        if token.cancel() {
            return;
        }
        // Closing first makes a delivery still in flight fail its send, and
        // the sending side puts that object back itself.
        self.rx.close();
        if let Ok(Ok(obj)) = self.rx.try_recv() {
            self.pool.put(obj);
        }
    }
}

/// Shut down every pool and complete `callback` once all of them stopped
///
/// Fails with [`PoolError::Aggregate`] if any pool could not be shut down.
pub fn shutdown_all<T, C>(pools: &[AsyncPool<T>], callback: C)
where
    T: Send + 'static,
    C: Callback<()> + 'static,
{
    let all = count_down(callback, pools.len());
    for pool in pools {
        pool.shutdown(all.clone());
    }
}

/// A checked-out object that returns itself to the pool when dropped
pub struct PooledObject<T: Send + 'static> {
    value: Option<T>,
    pool: AsyncPool<T>,
}

impl<T: Send + 'static> PooledObject<T> {
    fn new(value: T, pool: AsyncPool<T>) -> Self {
        Self {
            value: Some(value),
            pool,
        }
    }

    /// Destroy the object instead of returning it
    pub fn dispose(mut self) {
        if let Some(value) = self.value.take() {
            self.pool.dispose(value);
        }
    }

    /// Take the object out of the guard. It stays checked out; hand it back
    /// with [`AsyncPool::put`] or [`AsyncPool::dispose`].
    pub fn into_inner(mut self) -> T {
        match self.value.take() {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on consume"),
        }
    }
}

impl<T: Send + 'static> Deref for PooledObject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on consume"),
        }
    }
}

impl<T: Send + 'static> DerefMut for PooledObject<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken on consume"),
        }
    }
}

impl<T: Send + fmt::Debug + 'static> fmt::Debug for PooledObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledObject")
            .field("value", &self.value)
            .field("pool", &self.pool.name())
            .finish()
    }
}

impl<T: Send + 'static> Drop for PooledObject<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.put(value);
        }
    }
}
