use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use homepage_core::{ApiCallback, CallbackId};
use homepage_infra::{CallbackRegistry, InMemoryCallbackStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .expect("failed to build tokio runtime")
}

fn callback(id: CallbackId, version: &str) -> ApiCallback {
    ApiCallback::new(id, "card", version, "/api/card")
}

fn bench_upsert_latency(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("upsert_latency");
    group.sample_size(500);

    group.bench_function("create_fresh", |b| {
        let registry = CallbackRegistry::new(InMemoryCallbackStore::new());
        b.iter(|| {
            rt.block_on(registry.upsert("bench", &callback(CallbackId::new(), "1")))
                .unwrap();
        });
    });

    group.bench_function("update_existing", |b| {
        let registry = CallbackRegistry::new(InMemoryCallbackStore::new());
        let id = CallbackId::new();
        rt.block_on(registry.upsert("bench", &callback(id, "1"))).unwrap();
        b.iter(|| {
            rt.block_on(registry.upsert("bench", black_box(&callback(id, "2"))))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_list_by_application(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("list_by_application");

    for owned in [1usize, 10, 100] {
        let registry = CallbackRegistry::new(InMemoryCallbackStore::new());
        rt.block_on(async {
            for _ in 0..owned {
                registry.upsert("target", &callback(CallbackId::new(), "1")).await.unwrap();
            }
            // Noise owned by other applications; listing must skip it.
            for _ in 0..1000 {
                registry.upsert("other", &callback(CallbackId::new(), "1")).await.unwrap();
            }
        });

        group.throughput(Throughput::Elements(owned as u64));
        group.bench_with_input(BenchmarkId::from_parameter(owned), &owned, |b, _| {
            b.iter(|| {
                let listed = rt.block_on(registry.list_by_application("target")).unwrap();
                black_box(listed);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_upsert_latency, bench_list_by_application);
criterion_main!(benches);
