use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use segment::{segment, FallbackExtractor, SequentialIds};

fn bench_segment(c: &mut Criterion) {
    let extractor = FallbackExtractor::default();
    let mut group = c.benchmark_group("segment");

    for repeats in [1, 8, 64].iter() {
        let text = "cinematic photograph of a lonely lighthouse, golden hour, dramatic lighting, \
                    oil painting texture, highly detailed, 8k, "
            .repeat(*repeats);
        let tokens = extractor.extract(&text, &mut SequentialIds::default());
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("bytes_{}", text.len()), |b| {
            b.iter(|| segment(black_box(&text), black_box(&tokens)))
        });
    }

    group.finish();
}

fn bench_fallback(c: &mut Criterion) {
    let extractor = FallbackExtractor::default();
    let text = "serene watercolor of a mountain village at blue hour, soft lighting, pastel";
    c.bench_function("fallback_extract", |b| {
        b.iter(|| extractor.extract(black_box(text), &mut SequentialIds::default()))
    });
}

criterion_group!(benches, bench_segment, bench_fallback);
criterion_main!(benches);
