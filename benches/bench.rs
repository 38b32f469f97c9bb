//! Criterion benchmarks for the classifier.
//!
//! Covers the two hot paths of the lifecycle:
//! - Text normalization
//! - Cross-validated grid-search training

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ods_classifier::analysis::Normalizer;
use ods_classifier::dataset::Label;
use ods_classifier::ml::{HyperparameterGrid, Trainer};

/// Generate labeled passages for benchmarking.
fn generate_corpus(per_class: usize) -> (Vec<String>, Vec<Label>) {
    let pools: [(Label, &[&str]); 3] = [
        (
            1,
            &["pobreza", "ingresos", "hogares", "subsidio", "vivienda", "empleo", "salario"],
        ),
        (
            3,
            &["salud", "hospitales", "vacunación", "médicos", "enfermedades", "clínicas", "nutrición"],
        ),
        (
            4,
            &["educación", "docentes", "estudiantes", "aprendizaje", "becas", "colegios", "matrícula"],
        ),
    ];

    let mut texts = Vec::with_capacity(per_class * pools.len());
    let mut labels = Vec::with_capacity(per_class * pools.len());
    for (label, words) in pools {
        for i in 0..per_class {
            let length = 8 + (i % 12);
            let body: Vec<&str> = (0..length).map(|j| words[(i * 3 + j) % words.len()]).collect();
            texts.push(format!("¡Las políticas de {} en la región!", body.join(" y ")));
            labels.push(label);
        }
    }
    (texts, labels)
}

fn bench_normalization(c: &mut Criterion) {
    let normalizer = Normalizer::default();
    let (texts, _) = generate_corpus(100);

    let mut group = c.benchmark_group("normalization");
    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("normalize_batch", |b| {
        b.iter(|| normalizer.normalize_batch(black_box(&texts)).unwrap())
    });
    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let (texts, labels) = generate_corpus(60);
    let grid = HyperparameterGrid::alpha_only(vec![0.1, 0.5, 1.0], 3, 0.9);

    let mut group = c.benchmark_group("training");
    group.sample_size(10);
    for parallel in [false, true] {
        let trainer = Trainer::default()
            .with_grid(grid.clone())
            .with_parallel(parallel);
        let name = if parallel { "grid_search_parallel" } else { "grid_search_sequential" };
        group.bench_function(name, |b| {
            b.iter(|| trainer.train(black_box(&texts), black_box(&labels)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalization, bench_training);
criterion_main!(benches);
