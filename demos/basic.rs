//! Basic callback-driven usage of AsyncPool

use async_objectpool::{AsyncPool, BoxCallback, Lifecycle, PoolConfiguration, PoolResult, blocking};
use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out numbered "connections" immediately
struct Connections {
    next: AtomicU32,
}

impl Lifecycle<String> for Connections {
    fn create(&self, callback: BoxCallback<String>) {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        callback.complete(Ok(format!("conn-{id}")));
    }

    fn validate_get(&self, _conn: &String) -> bool {
        true
    }

    fn validate_put(&self, conn: &String) -> bool {
        !conn.ends_with("-broken")
    }

    fn destroy(&self, conn: String, error: bool, callback: BoxCallback<()>) {
        println!("   destroying {conn} (error: {error})");
        callback.complete(Ok(()));
    }
}

fn main() {
    println!("=== AsyncPool - Basic Examples ===\n");

    let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
    let _guard = runtime.enter();

    let pool = AsyncPool::new(
        "basic",
        PoolConfiguration::new().with_min_size(1).with_max_size(2),
        Connections {
            next: AtomicU32::new(0),
        },
    )
    .expect("valid configuration");
    pool.start().expect("fresh pool");

    callbacks(&pool);
    blocking_bridge(&pool);
    cancellation(&pool);

    let (cb, pending) = blocking::<()>();
    pool.shutdown(cb);
    println!("4. Shutdown: {:?}", pending.wait());
    println!("   {:?}", pool.stats());
}

fn callbacks(pool: &AsyncPool<String>) {
    println!("1. Callbacks:");
    let handle = pool.clone();
    pool.get(move |result: PoolResult<String>| {
        let conn = result.expect("object");
        println!("   got {conn}");
        handle.put(conn);
    });
    println!("   idle after return: {}\n", pool.stats().idle_count);
}

fn blocking_bridge(pool: &AsyncPool<String>) {
    println!("2. Blocking bridge:");
    let (cb, pending) = blocking::<String>();
    pool.get(cb);
    let conn = pending.wait().expect("object");
    println!("   got {conn}, checked out: {}", pool.stats().checked_out);
    pool.put(conn);
    println!();
}

fn cancellation(pool: &AsyncPool<String>) {
    println!("3. Cancellation:");
    let (first, first_rx) = blocking::<String>();
    let (second, second_rx) = blocking::<String>();
    pool.get(first);
    pool.get(second);
    let held = [first_rx.wait().expect("object"), second_rx.wait().expect("object")];

    // Pool is at its maximum, so this request waits
    let token = pool.get(|result: PoolResult<String>| println!("   never printed: {result:?}"));
    println!("   waiters: {}", pool.stats().waiters);
    println!("   cancelled: {}", token.cancel());

    for conn in held {
        pool.put(conn);
    }
    println!();
}
