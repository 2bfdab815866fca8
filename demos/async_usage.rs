//! Async usage with an AsyncLifecycle

use async_objectpool::{
    AsyncLifecycle, AsyncPool, EvictionPolicy, PoolConfiguration, PoolError, PoolResult,
    TokioLifecycle,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

/// Simulates a slow network handshake
struct Sessions {
    next: AtomicU32,
}

#[async_trait::async_trait]
impl AsyncLifecycle<u32> for Sessions {
    async fn create(&self) -> PoolResult<u32> {
        sleep(Duration::from_millis(20)).await;
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        if id == 3 {
            return Err(PoolError::CreateFailed(format!("handshake {id} refused")));
        }
        Ok(id)
    }

    async fn destroy(&self, _session: u32, _error: bool) -> PoolResult<()> {
        sleep(Duration::from_millis(5)).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("async_objectpool=debug")),
        )
        .init();

    println!("=== AsyncPool - Async Examples ===\n");

    let lifecycle = TokioLifecycle::new(
        Sessions {
            next: AtomicU32::new(0),
        },
        tokio::runtime::Handle::current(),
    );
    let config = PoolConfiguration::new()
        .with_min_size(1)
        .with_max_size(3)
        .with_idle_timeout(Duration::from_millis(300))
        .with_eviction_policy(EvictionPolicy::Mru);
    let pool = AsyncPool::new("sessions", config, lifecycle).expect("valid configuration");
    pool.start().expect("fresh pool");

    async_get(&pool).await;
    with_timeout(&pool).await;
    concurrent_access(&pool).await;
    idle_reaping(&pool).await;

    pool.shutdown_async().await.expect("clean shutdown");
    println!("Final stats: {:?}", pool.stats());
}

async fn async_get(pool: &AsyncPool<u32>) {
    println!("1. Async get:");
    let session = pool.get_async().await.expect("session");
    println!("   got session {}", *session);
    println!();
}

async fn with_timeout(pool: &AsyncPool<u32>) {
    println!("2. Timeout:");
    match pool.get_timeout(Duration::from_millis(5)).await {
        Ok(session) => println!("   idle session {} was ready", *session),
        Err(e) => println!("   {e}"),
    }
    println!();
}

async fn concurrent_access(pool: &AsyncPool<u32>) {
    println!("3. Concurrent access:");
    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                match pool.get_async().await {
                    Ok(session) => {
                        sleep(Duration::from_millis(10)).await;
                        println!("   task {i} used session {}", *session);
                    }
                    Err(e) => println!("   task {i} failed: {e}"),
                }
            })
        })
        .collect();
    for task in tasks {
        let _ = task.await;
    }
    println!("   {:?}\n", pool.stats());
}

async fn idle_reaping(pool: &AsyncPool<u32>) {
    println!("4. Idle reaping:");
    sleep(Duration::from_secs(2)).await;
    let stats = pool.stats();
    println!(
        "   idle: {}, reaped: {}\n",
        stats.idle_count, stats.total_timeout
    );
}
