use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexispark_core::{normalize, BloomFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn corpus(size: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..size)
        .map(|_| {
            let len = rng.gen_range(3..12);
            (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
        })
        .collect()
}

fn bench_bloom(c: &mut Criterion) {
    let words = corpus(50_000);
    let filter = BloomFilter::from_words(&words, 0.01).unwrap();
    let bytes = filter.to_bytes();

    c.bench_function("build_50k", |b| {
        b.iter(|| BloomFilter::from_words(black_box(&words), 0.01).unwrap())
    });
    c.bench_function("contains", |b| {
        b.iter(|| filter.contains(black_box("zygote")))
    });
    c.bench_function("decode_50k", |b| {
        b.iter(|| BloomFilter::from_bytes(black_box(&bytes)).unwrap())
    });
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("Œuvres complètes d'Ångström")))
    });
}

criterion_group!(benches, bench_bloom);
criterion_main!(benches);
