use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_core::prompt::{build_prompt, FeedbackRequest};
use theoryquiz_core::question::{sample_distinct, QuestionGenerator};

fn bench_generate(c: &mut Criterion) {
    let generator = QuestionGenerator::new(Arc::new(KnowledgeBase::builtin().unwrap()));
    let mut group = c.benchmark_group("question");

    group.bench_function("generate_seeded", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| generator.generate_with(black_box(&mut rng)))
    });

    group.bench_function("generate_thread_rng", |b| b.iter(|| generator.generate()));

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let names: Vec<String> = (0..50).map(|i| format!("Theory {i}")).collect();
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("sample_distinct/50->3", |b| {
        b.iter(|| sample_distinct(&mut rng, black_box(&names), 3))
    });
}

fn bench_knowledge(c: &mut Criterion) {
    let kb = KnowledgeBase::builtin().unwrap();

    c.bench_function("flatten_builtin", |b| b.iter(|| black_box(&kb).flatten()));

    c.bench_function("check_request", |b| {
        let request = FeedbackRequest::new("John Bowlby", "Psychoanalytic Theory", "Attachment Theory");
        b.iter(|| kb.check_request(black_box(&request)))
    });

    c.bench_function("build_prompt", |b| {
        let request = FeedbackRequest::new("John Bowlby", "Psychoanalytic Theory", "Attachment Theory");
        b.iter(|| build_prompt(black_box(&request)))
    });
}

criterion_group!(benches, bench_generate, bench_sampling, bench_knowledge);
criterion_main!(benches);
