//! Backend comparison benchmarks.
//!
//! Single-row inserts and full-table list fetches for each SQLite backend,
//! over the same schema the harness uses.

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dalbench::{bootstrap_file, Adapter, CachedSqliteAdapter, Dialect, SqliteAdapter};

fn open_backends(path: &Path) -> Vec<Box<dyn Adapter>> {
    bootstrap_file(path, Dialect::Sqlite).expect("bootstrap schema");

    let mut backends: Vec<Box<dyn Adapter>> = vec![
        Box::new(SqliteAdapter::open(path).expect("open rusqlite backend")),
        Box::new(CachedSqliteAdapter::open(path).expect("open cached backend")),
    ];
    #[cfg(feature = "sqlx")]
    backends.push(Box::new(
        dalbench::SqlxAdapter::open(path).expect("open sqlx backend"),
    ));
    backends
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapters/insert");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bench.db");
    let backends = open_backends(&path);

    for backend in &backends {
        group.bench_function(backend.name(), |b| {
            b.iter(|| black_box(backend.insert().expect("insert")));
        });
        backend.delete().expect("delete");
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapters/list");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bench.db");
    let backends = open_backends(&path);

    for rows in [100, 1_000] {
        backends[0].delete().expect("delete");
        backends[0].batch_insert(rows).expect("seed");

        for backend in &backends {
            group.bench_with_input(BenchmarkId::new(backend.name(), rows), &rows, |b, _| {
                b.iter(|| {
                    let students = backend.list().expect("list");
                    black_box(students.len());
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_list);
criterion_main!(benches);
