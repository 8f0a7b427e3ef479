//! Prediction throughput over a synthetic model.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use nb_core::{Model, Observation};

fn synthetic_model(classes: usize, words_per_class: usize) -> Model {
    let mut model = Model::new("bench");
    for class in 0..classes {
        let text = (0..words_per_class)
            .map(|word| format!("w{}", (class * 7 + word) % (words_per_class * 2)))
            .collect::<Vec<_>>()
            .join(" ");
        let label = format!("class{class}");
        for _ in 0..4 {
            model.train(&Observation::from_text([label.as_str()], &text));
        }
    }
    model
}

fn bench_predict(c: &mut Criterion) {
    let model = synthetic_model(16, 256);
    let short = Observation::unlabeled("w1 w2 w3 w4 w5");
    let long_text = (0..2_000)
        .map(|i| format!("w{}", i % 600))
        .collect::<Vec<_>>()
        .join(" ");
    let long = Observation::unlabeled(&long_text);

    c.bench_function("predict_short_text", |b| {
        b.iter(|| model.predict(black_box(&short)));
    });
    c.bench_function("predict_long_text", |b| {
        b.iter(|| model.predict(black_box(&long)));
    });
}

fn bench_train(c: &mut Criterion) {
    let observation = Observation::from_text(["spam"], "buy cheap pills now buy now");
    c.bench_function("train_single_observation", |b| {
        b.iter_batched(
            || synthetic_model(4, 64),
            |mut model| {
                model.train(black_box(&observation));
                model
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_predict, bench_train);
criterion_main!(benches);
