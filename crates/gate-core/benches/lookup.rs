use criterion::{Criterion, criterion_group, criterion_main};
use gate_core::{BoundarySearch, GateConfig};
use std::hint::black_box;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

/// A governed project with `depth` nested source dirs and a handful of dependencies.
fn build_tree(depth: usize) -> (TempDir, Vec<PathBuf>) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("project");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join(".babelrc"), "{}").unwrap();

    let mut files = Vec::new();
    let mut dir = root.join("src");
    for i in 0..depth {
        dir = dir.join(format!("level{i}"));
        let file = dir.join("mod.js");
        touch(&file);
        files.push(file);
    }
    for dep in ["react", "lodash", "left-pad", "moment"] {
        let file = root.join("node_modules").join(dep).join("lib/index.js");
        touch(&file);
        files.push(file);
    }
    (tmp, files)
}

fn bench_cold_lookup(c: &mut Criterion) {
    let (_tmp, files) = build_tree(12);
    let config = GateConfig::default();

    c.bench_function("cold_lookup_16_files", |b| {
        b.iter(|| {
            let search = BoundarySearch::with_config(&config);
            for file in &files {
                black_box(search.is_governed(black_box(file)));
            }
        })
    });
}

fn bench_cached_lookup(c: &mut Criterion) {
    let (_tmp, files) = build_tree(12);
    let search = BoundarySearch::with_config(&GateConfig::default());
    for file in &files {
        search.is_governed(file);
    }

    c.bench_function("cached_lookup_16_files", |b| {
        b.iter(|| {
            for file in &files {
                black_box(search.is_governed(black_box(file)));
            }
        })
    });
}

criterion_group!(benches, bench_cold_lookup, bench_cached_lookup);
criterion_main!(benches);
