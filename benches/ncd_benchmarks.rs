use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sigmatch::codec::{CodecRegistry, BUILTIN_METHODS};
use sigmatch::ncd_score;
use sigmatch::store::{concatenate, size_in_bits, Artifact};

fn codec_throughput(c: &mut Criterion) {
    let registry = CodecRegistry::builtin();
    let data = "the melody rises and falls over a steady beat "
        .repeat(1400)
        .into_bytes();
    let mut group = c.benchmark_group("compress_64k");
    for method in BUILTIN_METHODS {
        group.bench_function(method, |b| {
            b.iter(|| registry.compress(method, black_box(&data)).unwrap())
        });
    }
    group.finish();
}

fn pair_scoring(c: &mut Criterion) {
    let registry = CodecRegistry::builtin();
    let signature = Artifact::from_bytes(
        "sig",
        "a reference signature with recurring phrases "
            .repeat(700)
            .into_bytes(),
    );
    let probe = Artifact::from_bytes(
        "probe",
        "a probe segment with recurring phrases ".repeat(350).into_bytes(),
    );
    c.bench_function("score_pair_zstd", |b| {
        b.iter(|| {
            let sig_bits = size_in_bits(&registry.compress("zstd", &signature.bytes).unwrap());
            let probe_bits = size_in_bits(&registry.compress("zstd", &probe.bytes).unwrap());
            let combined = concatenate(&signature, &probe);
            let concat_bits = size_in_bits(&registry.compress("zstd", &combined).unwrap());
            black_box(ncd_score(concat_bits, sig_bits, probe_bits))
        })
    });
}

criterion_group!(benches, codec_throughput, pair_scoring);
criterion_main!(benches);
