//! Per-resource construction, validation and teardown

use crate::callback::BoxCallback;
use crate::errors::PoolResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Callback-driven lifecycle of one kind of pooled resource
///
/// `create` and `destroy` may complete on any thread, synchronously or later.
/// The pool never holds its lock while calling into a lifecycle, so
/// implementations may call back into the pool.
pub trait Lifecycle<T>: Send + Sync {
    /// Build a new object and report it through `callback`
    fn create(&self, callback: BoxCallback<T>);

    /// Whether an idle object may be handed out
    fn validate_get(&self, obj: &T) -> bool;

    /// Whether a returned object may go back into the pool
    fn validate_put(&self, obj: &T) -> bool;

    /// Tear down `obj`. `error` is set when the object is being discarded
    /// because it misbehaved.
    fn destroy(&self, obj: T, error: bool, callback: BoxCallback<()>);
}

/// Lifecycle written with `async fn`s
///
/// Wrap it in a [`TokioLifecycle`] to hand it to a pool.
///
/// # Examples
///
/// ```
/// use async_objectpool::{AsyncLifecycle, PoolResult};
///
/// struct Buffers;
///
/// #[async_trait::async_trait]
/// impl AsyncLifecycle<Vec<u8>> for Buffers {
///     async fn create(&self) -> PoolResult<Vec<u8>> {
///         Ok(Vec::with_capacity(4096))
///     }
///
///     fn validate_put(&self, buf: &Vec<u8>) -> bool {
///         buf.capacity() >= 4096
///     }
///
///     async fn destroy(&self, _buf: Vec<u8>, _error: bool) -> PoolResult<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncLifecycle<T>: Send + Sync + 'static {
    async fn create(&self) -> PoolResult<T>;

    fn validate_get(&self, _obj: &T) -> bool {
        true
    }

    fn validate_put(&self, _obj: &T) -> bool {
        true
    }

    async fn destroy(&self, obj: T, error: bool) -> PoolResult<()>;
}

/// Runs an [`AsyncLifecycle`] on a tokio runtime
pub struct TokioLifecycle<L> {
    inner: Arc<L>,
    runtime: Handle,
}

impl<L> fmt::Debug for TokioLifecycle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioLifecycle").finish_non_exhaustive()
    }
}

impl<L> TokioLifecycle<L> {
    pub fn new(inner: L, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(inner),
            runtime,
        }
    }
}

impl<T, L> Lifecycle<T> for TokioLifecycle<L>
where
    T: Send + 'static,
    L: AsyncLifecycle<T>,
{
    fn create(&self, callback: BoxCallback<T>) {
        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(async move {
            callback.complete(inner.create().await);
        });
    }

    fn validate_get(&self, obj: &T) -> bool {
        self.inner.validate_get(obj)
    }

    fn validate_put(&self, obj: &T) -> bool {
        self.inner.validate_put(obj)
    }

    fn destroy(&self, obj: T, error: bool, callback: BoxCallback<()>) {
        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(async move {
            callback.complete(inner.destroy(obj, error).await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::blocking;
    use crate::errors::PoolError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        created: AtomicUsize,
        destroyed: AtomicUsize,
    }

    #[async_trait]
    impl AsyncLifecycle<usize> for Counting {
        async fn create(&self) -> PoolResult<usize> {
            tokio::task::yield_now().await;
            Ok(self.created.fetch_add(1, Ordering::SeqCst))
        }

        fn validate_put(&self, obj: &usize) -> bool {
            *obj < 10
        }

        async fn destroy(&self, obj: usize, error: bool) -> PoolResult<()> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            if error {
                Err(PoolError::DestroyFailed(format!("object {obj}")))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tokio_lifecycle_drives_async_impl() {
        let lifecycle = TokioLifecycle::new(
            Counting {
                created: AtomicUsize::new(0),
                destroyed: AtomicUsize::new(0),
            },
            Handle::current(),
        );

        let (cb, pending) = blocking::<usize>();
        Lifecycle::<usize>::create(&lifecycle, Box::new(cb));
        let obj = tokio::task::spawn_blocking(move || pending.wait())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(obj, 0);

        assert!(lifecycle.validate_get(&obj));
        assert!(lifecycle.validate_put(&obj));
        assert!(!lifecycle.validate_put(&42usize));

        let (cb, pending) = blocking::<()>();
        lifecycle.destroy(obj, true, Box::new(cb));
        let result = tokio::task::spawn_blocking(move || pending.wait())
            .await
            .unwrap();
        assert_eq!(result, Err(PoolError::DestroyFailed("object 0".into())));
        assert_eq!(lifecycle.inner.destroyed.load(Ordering::SeqCst), 1);
    }
}
