use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jpatch_benches::available_corpora;
use jpatch_core::{DiffOptions, Patch};

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    let options = DiffOptions::default();
    for corpus in available_corpora() {
        let dataset = corpus.load();
        group.throughput(Throughput::Bytes(dataset.json_bytes() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(corpus.name()), &dataset, |b, dataset| {
            b.iter(|| {
                let patch = dataset.diff(&options);
                black_box(patch);
            });
        });
    }
    group.finish();
}

fn bench_diff_limited(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff-lcs-limit");
    let options = DiffOptions::default().with_lcs_cell_limit(10_000).expect("valid limit");
    for corpus in available_corpora() {
        let dataset = corpus.load();
        group.throughput(Throughput::Bytes(dataset.json_bytes() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(corpus.name()), &dataset, |b, dataset| {
            b.iter(|| black_box(dataset.diff(&options)));
        });
    }
    group.finish();
}

fn bench_patch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch-apply");
    let options = DiffOptions::default().with_test_guards(true);
    for corpus in available_corpora() {
        let dataset = corpus.load();
        let patch = dataset.diff(&options);
        group.throughput(Throughput::Elements(patch.len() as u64));
        group.bench_function(corpus.name(), {
            let dataset = dataset.clone();
            let patch = patch.clone();
            move |b| {
                b.iter(|| {
                    let result = patch.apply(dataset.before()).expect("patch success");
                    black_box(result);
                });
            }
        });
    }
    group.finish();
}

fn bench_wire(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch-wire");
    for corpus in available_corpora() {
        let dataset = corpus.load();
        let wire = dataset.diff(&DiffOptions::default()).to_json_string();
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_function(corpus.name(), move |b| {
            b.iter(|| {
                let patch = Patch::from_json_str(&wire).expect("valid patch");
                black_box(patch.to_json_string());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diff, bench_diff_limited, bench_patch_apply, bench_wire);
criterion_main!(benches);
