use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use depot_storage::{RelativePath, Storage, WriteMode, contain, has_traversal_marker};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Benchmark: Path Validation & Containment
// ============================================================================

fn bench_path_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_resolution");

    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    std::fs::create_dir_all(root.join("purchases/u1")).unwrap();

    group.bench_function("build_relative_path", |b| {
        b.iter(|| {
            black_box(RelativePath::parse(black_box("purchases/u1/o1/receipt_1.png")).unwrap());
        });
    });

    group.bench_function("traversal_screen", |b| {
        b.iter(|| black_box(has_traversal_marker(black_box("uploads/logos/../../etc/passwd"))));
    });

    group.bench_function("contain_existing_parent", |b| {
        b.iter(|| black_box(contain(&root, "purchases/u1/receipt_1.png").unwrap()));
    });

    group.bench_function("contain_deep_missing_chain", |b| {
        b.iter(|| black_box(contain(&root, "purchases/u1/o1/a/b/c/receipt_1.png").unwrap()));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Atomic Publishing
// ============================================================================

fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("writes");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async {
        Storage::builder().root(temp.path()).create(true).connect().await.unwrap()
    });
    let counter = AtomicU64::new(0);

    let sizes = [("10KB", 10 * 1024), ("1MB", 1024 * 1024)];

    for (name, size) in sizes {
        let data: Vec<u8> = (0..size).map(|i| u8::try_from(i % 256).unwrap()).collect();
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("replace", name), &data, |b, data| {
            let path = RelativePath::parse(&format!("logos/logo_{name}.png")).unwrap();
            b.to_async(&rt).iter(|| async {
                storage.write(&path, data, WriteMode::Replace).await.unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("create_new", name), &data, |b, data| {
            b.to_async(&rt).iter(|| async {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                let path = RelativePath::parse(&format!("project-images/p1/project_{n}.png")).unwrap();
                storage.write(&path, data, WriteMode::CreateNew).await.unwrap();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Directory Indexing
// ============================================================================

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async {
        let storage = Storage::builder().root(temp.path()).create(true).connect().await.unwrap();
        for i in 0..500 {
            let path = RelativePath::parse(&format!("purchases/u{}/o{i}/receipt_{i}.pdf", i % 20))
                .unwrap();
            storage.write(&path, b"%PDF", WriteMode::CreateNew).await.unwrap();
        }
        storage
    });
    let dir = RelativePath::parse("purchases").unwrap();

    group.bench_function("list_500_files", |b| {
        b.to_async(&rt).iter(|| async { black_box(storage.index(&dir).await.unwrap()) });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_path_resolution, bench_writes, bench_index);

criterion_main!(benches);
