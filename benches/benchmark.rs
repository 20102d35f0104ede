// Benchmarks for index builds, query resolution and relatedness ranking
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use folio::prelude::*;
use folio::{OverlapRanker, TermVectorBuilder};
use folio_core::ReverseIndex;
use rand::prelude::*;

const WORDS: &[&str] = &[
    "circle", "line", "square", "grid", "red", "blue", "yellow", "black", "calm", "tense",
    "geometric", "organic", "abstract", "portrait", "landscape", "oil", "canvas", "paper",
    "light", "shadow", "rhythm", "balance", "tower", "river", "city", "moon",
];

fn random_words(rng: &mut impl Rng, n: usize) -> Vec<String> {
    (0..n)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())].to_string())
        .collect()
}

fn generate_catalog(size: usize) -> Records {
    let mut rng = rand::rng();
    let folders = ["bauhaus", "cubism", "dada", "fauvism"];
    let mut records = Records::new();
    for i in 0..size {
        let folder = folders[i % folders.len()];
        records.insert(
            format!("{folder}/image{i:05}.jpg"),
            Record::new()
                .with("title", random_words(&mut rng, 3).join(" "))
                .with("year", format!("{}", rng.random_range(1900..2000)))
                .with("elements", random_words(&mut rng, 5))
                .with("dominant_colors", random_words(&mut rng, 2))
                .with("mood", random_words(&mut rng, 2).join(", "))
                .with("topics", random_words(&mut rng, 3)),
        );
    }
    records
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for size in [100, 1000, 5000].iter() {
        let records = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("reverse_index", size), &records, |b, records| {
            b.iter(|| ReverseIndex::build(black_box(records)));
        });
    }

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let engine = Engine::from_records(generate_catalog(2000));

    let queries = [
        ("browse", Query::all()),
        ("exact", Query::new("\"red\"")),
        ("fuzzy", Query::new("circles geometrc")),
        ("fuzzy_folder", Query::new("landscape").in_folder("dada")),
    ];
    for (name, query) in queries.iter() {
        group.bench_function(*name, |b| {
            b.iter(|| engine.search(black_box(query)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_related(c: &mut Criterion) {
    let mut group = c.benchmark_group("related");
    let records = generate_catalog(2000);
    let reference = "bauhaus/image00000.jpg";

    let ranker = OverlapRanker::default();
    group.bench_function("overlap", |b| {
        b.iter(|| ranker.related(black_box(reference), &records, None).unwrap());
    });

    let engine = Engine::from_records(records.clone());
    engine.build_vectors().unwrap();
    group.bench_function("term_vector", |b| {
        b.iter(|| {
            engine
                .related(black_box(reference), None, RelatedMethod::TermVector)
                .unwrap()
        });
    });

    group.bench_function("build_vectors", |b| {
        b.iter(|| TermVectorBuilder::new().build(black_box(&records)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_index_build, benchmark_search, benchmark_related);
criterion_main!(benches);
