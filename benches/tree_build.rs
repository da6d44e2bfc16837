//! Benchmarks for module tree building
//!
//! Builds and compacts trees over large synthetic module sets, shaped
//! like a typical app: a handful of source folders plus a deep
//! node_modules hierarchy.

use bundlescope::tree::path::split_module_path;
use bundlescope::tree::{build_tree, Folder, ModuleUnit, ROOT_NAME};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Create `count` module units spread over packages and nested folders
fn create_units(count: usize) -> Vec<ModuleUnit> {
    (0..count)
        .map(|i| {
            let path = if i % 3 == 0 {
                format!("./src/feature-{}/components/Widget{}.js", i % 17, i)
            } else {
                format!(
                    "./node_modules/pkg-{}/lib/internal/deep/module-{}.js",
                    i % 97,
                    i
                )
            };
            ModuleUnit::Leaf {
                segments: split_module_path(&path),
                size: (i as u64 % 5000) + 100,
                parsed_src: None,
            }
        })
        .collect()
}

/// Benchmark building a compacted tree
fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for count in [100, 1_000, 10_000] {
        let units = create_units(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &units, |b, units| {
            b.iter(|| build_tree(black_box(units)))
        });
    }

    group.finish();
}

/// Benchmark the compaction pass on its own
fn bench_merge_nested_folders(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_merge");

    for count in [1_000, 10_000] {
        let units = create_units(count);
        let mut uncompacted = Folder::new(ROOT_NAME);
        for unit in &units {
            uncompacted.add_module(unit);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &uncompacted,
            |b, tree| {
                b.iter(|| {
                    let mut tree = tree.clone();
                    tree.merge_nested_folders();
                    tree
                })
            },
        );
    }

    group.finish();
}

/// Benchmark chart data conversion
fn bench_to_chart_data(c: &mut Criterion) {
    let tree = build_tree(&create_units(10_000));

    c.bench_function("tree_to_chart_data_10000", |b| {
        b.iter(|| black_box(&tree).to_chart_data())
    });
}

criterion_group!(
    benches,
    bench_build_tree,
    bench_merge_nested_folders,
    bench_to_chart_data
);
criterion_main!(benches);
