use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use scmextract_core::{Extractor, VariableFilter};
use scmextract_parser::AstExtractor;
use std::hint::black_box;

/// Generate a synthetic model with `n` chained update equations inside a time loop
fn synthetic_model(n: usize) -> String {
    let mut source = String::from("def run(steps):\n    history = []\n    for t in range(steps):\n");
    for i in 0..n {
        let parent = if i == 0 { "seed".to_string() } else { format!("v{}", i - 1) };
        source.push_str(&format!("        v{i} = {parent} * rate{i} + v{i}\n"));
    }
    source.push_str("        history.append(v0 + seed)\n    return history\n");
    source
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = AstExtractor::new();
    let mut group = c.benchmark_group("ast_extraction");

    for size in [10, 100, 1000] {
        let source = synthetic_model(size);
        let filter = VariableFilter::only((0..size).map(|i| format!("v{i}")));

        group.bench_with_input(BenchmarkId::new("unfiltered", size), &source, |b, source| {
            b.iter(|| extractor.extract_from_str(black_box(source), &VariableFilter::All))
        });
        group.bench_with_input(BenchmarkId::new("filtered", size), &source, |b, source| {
            b.iter(|| extractor.extract_from_str(black_box(source), &filter))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
