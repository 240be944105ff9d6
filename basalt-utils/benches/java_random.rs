use basalt_utils::JavaRandom;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_java_random(c: &mut Criterion) {
    c.bench_function("next_i32", |b| {
        let mut rand = JavaRandom::new(1234);
        b.iter(|| black_box(rand.next_i32()));
    });

    c.bench_function("next_i32_bounded_16", |b| {
        let mut rand = JavaRandom::new(1234);
        b.iter(|| black_box(rand.next_i32_bounded(16)));
    });

    c.bench_function("next_f64", |b| {
        let mut rand = JavaRandom::new(1234);
        b.iter(|| black_box(rand.next_f64()));
    });

    c.bench_function("next_gaussian", |b| {
        let mut rand = JavaRandom::new(1234);
        b.iter(|| black_box(rand.next_gaussian()));
    });
}

criterion_group!(benches, bench_java_random);
criterion_main!(benches);
