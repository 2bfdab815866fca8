//! Checkout and return throughput
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use async_objectpool::{
    AsyncPool, BoxCallback, Lifecycle, LinkedDeque, PoolConfiguration, PoolResult, blocking,
};
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

struct Immediate;

impl Lifecycle<u64> for Immediate {
    fn create(&self, callback: BoxCallback<u64>) {
        callback.complete(Ok(0));
    }

    fn validate_get(&self, _: &u64) -> bool {
        true
    }

    fn validate_put(&self, _: &u64) -> bool {
        true
    }

    fn destroy(&self, _: u64, _: bool, callback: BoxCallback<()>) {
        callback.complete(Ok(()));
    }
}

fn entrypoint(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
    let _guard = runtime.enter();

    let pool = AsyncPool::new(
        "bench",
        PoolConfiguration::new().with_min_size(1).with_max_size(1),
        Immediate,
    )
    .expect("valid configuration");
    pool.start().expect("fresh pool");

    let mut group = c.benchmark_group("pool");

    group.bench_function("get_put_idle_hit", |b| {
        b.iter(|| {
            let handle = pool.clone();
            pool.get(move |result: PoolResult<u64>| {
                if let Ok(obj) = result {
                    handle.put(black_box(obj));
                }
            });
        });
    });

    group.bench_function("get_put_blocking_bridge", |b| {
        b.iter(|| {
            let (cb, pending) = blocking::<u64>();
            pool.get(cb);
            if let Ok(obj) = pending.wait() {
                pool.put(black_box(obj));
            }
        });
    });

    group.bench_function("get_async_put", |b| {
        b.iter(|| {
            runtime.block_on(async {
                drop(black_box(pool.get_async().await));
            });
        });
    });

    group.bench_function("waiter_enqueue_cancel", |b| {
        let mut waiters = LinkedDeque::new();
        b.iter(|| {
            let handle = waiters.add_last(black_box(1_u64));
            black_box(waiters.remove(handle));
        });
    });

    group.finish();
}
