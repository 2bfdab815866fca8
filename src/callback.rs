//! Single-shot completion callbacks
//!
//! Every asynchronous operation in this crate reports its outcome through a
//! [`Callback`]: exactly one success value or one error. The callback is
//! consumed when it completes, so it cannot be invoked twice.

use crate::errors::{PoolError, PoolResult};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Receives the outcome of an asynchronous operation
///
/// Any `FnOnce(PoolResult<T>) + Send` closure is a callback.
///
/// # Examples
///
/// ```
/// use async_objectpool::{Callback, PoolResult};
///
/// let cb = |result: PoolResult<u32>| assert_eq!(result, Ok(7));
/// Box::new(cb).complete(Ok(7));
/// ```
pub trait Callback<T>: Send {
    /// Deliver the outcome. Consumes the callback.
    fn complete(self: Box<Self>, result: PoolResult<T>);
}

impl<T, F> Callback<T> for F
where
    F: FnOnce(PoolResult<T>) + Send,
{
    fn complete(self: Box<Self>, result: PoolResult<T>) {
        (*self)(result)
    }
}

/// A boxed callback, as stored by the pool and passed to lifecycles
pub type BoxCallback<T> = Box<dyn Callback<T>>;

/// A callback that ignores its outcome
pub fn empty<T: 'static>() -> BoxCallback<T> {
    Box::new(|_: PoolResult<T>| {})
}

struct MultiInner {
    remaining: AtomicUsize,
    errors: Mutex<Vec<PoolError>>,
    downstream: Mutex<Option<BoxCallback<()>>>,
}

/// Waits for a fixed number of completions, then completes one downstream callback
///
/// Each clone is one completion slot. The downstream callback succeeds if
/// every completion succeeded, otherwise it fails with
/// [`PoolError::Aggregate`] holding all recorded errors.
///
/// # Panics
///
/// Completing more times than the count given to [`count_down`] panics.
#[derive(Clone)]
pub struct MultiCallback {
    inner: Arc<MultiInner>,
}

impl fmt::Debug for MultiCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiCallback")
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl MultiCallback {
    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    fn record(&self, result: PoolResult<()>) {
        if let Err(e) = result {
            self.inner.errors.lock().push(e);
        }

        let previous = self
            .inner
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match previous {
            Ok(1) => self.finish(),
            Ok(_) => {}
            Err(_) => panic!("MultiCallback completed more times than its count"),
        }
    }

    fn finish(&self) {
        let errors = std::mem::take(&mut *self.inner.errors.lock());
        let downstream = self.inner.downstream.lock().take();
        if let Some(cb) = downstream {
            if errors.is_empty() {
                cb.complete(Ok(()));
            } else {
                cb.complete(Err(PoolError::Aggregate(errors)));
            }
        }
    }
}

impl Callback<()> for MultiCallback {
    fn complete(self: Box<Self>, result: PoolResult<()>) {
        self.record(result);
    }
}

/// Build an aggregator that completes `callback` after `count` completions
///
/// A count of zero completes `callback` immediately.
///
/// # Examples
///
/// ```
/// use async_objectpool::{Callback, PoolResult, count_down};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&fired);
/// let multi = count_down(move |r: PoolResult<()>| flag.store(r.is_ok(), Ordering::SeqCst), 2);
///
/// Box::new(multi.clone()).complete(Ok(()));
/// assert!(!fired.load(Ordering::SeqCst));
/// Box::new(multi).complete(Ok(()));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
pub fn count_down<C>(callback: C, count: usize) -> MultiCallback
where
    C: Callback<()> + 'static,
{
    let downstream: BoxCallback<()> = Box::new(callback);
    if count == 0 {
        downstream.complete(Ok(()));
        return MultiCallback {
            inner: Arc::new(MultiInner {
                remaining: AtomicUsize::new(0),
                errors: Mutex::new(Vec::new()),
                downstream: Mutex::new(None),
            }),
        };
    }

    MultiCallback {
        inner: Arc::new(MultiInner {
            remaining: AtomicUsize::new(count),
            errors: Mutex::new(Vec::new()),
            downstream: Mutex::new(Some(downstream)),
        }),
    }
}

/// Callback half of a blocking bridge, see [`blocking`]
pub struct FutureCallback<T> {
    tx: Sender<PoolResult<T>>,
}

impl<T> fmt::Debug for FutureCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureCallback").finish_non_exhaustive()
    }
}

impl<T: Send> Callback<T> for FutureCallback<T> {
    fn complete(self: Box<Self>, result: PoolResult<T>) {
        // The waiting side may have given up already.
        let _ = self.tx.send(result);
    }
}

/// Waiting half of a blocking bridge, see [`blocking`]
pub struct Pending<T> {
    rx: Receiver<PoolResult<T>>,
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("done", &self.is_done())
            .finish()
    }
}

impl<T> Pending<T> {
    /// Whether the outcome has been delivered
    pub fn is_done(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Block the current thread until the outcome arrives
    ///
    /// Fails with [`PoolError::Cancelled`] if the callback was dropped
    /// without completing.
    pub fn wait(self) -> PoolResult<T> {
        self.rx.recv().unwrap_or(Err(PoolError::Cancelled))
    }

    /// Block for at most `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> PoolResult<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(PoolError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(PoolError::Cancelled),
        }
    }
}

/// Bridge the callback contract to a blocking wait for synchronous callers
///
/// # Examples
///
/// ```
/// use async_objectpool::{Callback, blocking};
///
/// let (callback, pending) = blocking::<&str>();
/// std::thread::spawn(move || Box::new(callback).complete(Ok("done")));
/// assert_eq!(pending.wait(), Ok("done"));
/// ```
pub fn blocking<T>() -> (FutureCallback<T>, Pending<T>) {
    let (tx, rx) = channel::bounded(1);
    (FutureCallback { tx }, Pending { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn recorder() -> (Arc<Mutex<Option<PoolResult<()>>>>, impl Callback<()> + 'static) {
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        (slot, move |r: PoolResult<()>| *sink.lock() = Some(r))
    }

    #[test]
    fn test_count_down_success() {
        let (slot, cb) = recorder();
        let multi = count_down(cb, 3);

        for _ in 0..2 {
            Box::new(multi.clone()).complete(Ok(()));
        }
        assert!(slot.lock().is_none());
        assert_eq!(multi.remaining(), 1);

        Box::new(multi).complete(Ok(()));
        assert_eq!(*slot.lock(), Some(Ok(())));
    }

    #[test]
    fn test_count_down_collects_errors() {
        let (slot, cb) = recorder();
        let multi = count_down(cb, 3);

        Box::new(multi.clone()).complete(Err(PoolError::Cancelled));
        Box::new(multi.clone()).complete(Ok(()));
        Box::new(multi).complete(Err(PoolError::CreateFailed("boom".into())));

        let result = slot.lock().take();
        match result {
            Some(Err(PoolError::Aggregate(errors))) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.contains(&PoolError::Cancelled));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_count_down_zero_fires_immediately() {
        let (slot, cb) = recorder();
        let multi = count_down(cb, 0);
        assert_eq!(*slot.lock(), Some(Ok(())));
        assert_eq!(multi.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "more times than its count")]
    fn test_count_down_over_completion_panics() {
        let multi = count_down(|_: PoolResult<()>| {}, 1);
        Box::new(multi.clone()).complete(Ok(()));
        Box::new(multi).complete(Ok(()));
    }

    #[test]
    fn test_count_down_across_threads() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let multi = count_down(
            move |r: PoolResult<()>| flag.store(r.is_ok(), Ordering::SeqCst),
            8,
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = multi.clone();
                std::thread::spawn(move || Box::new(m).complete(Ok(())))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_blocking_bridge() {
        let (cb, pending) = blocking::<u32>();
        assert!(!pending.is_done());
        Box::new(cb).complete(Ok(5));
        assert!(pending.is_done());
        assert_eq!(pending.wait(), Ok(5));
    }

    #[test]
    fn test_blocking_bridge_timeout_and_drop() {
        let (cb, pending) = blocking::<u32>();
        let timeout = Duration::from_millis(10);
        assert_eq!(pending.wait_timeout(timeout), Err(PoolError::Timeout(timeout)));

        drop(cb);
        assert_eq!(pending.wait(), Err(PoolError::Cancelled));
    }
}
