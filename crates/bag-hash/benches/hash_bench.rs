use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use bag_hash::hex::to_hex;
use bag_hash::{digest_reader, HashAlgorithm, Hasher};

fn hash_throughput(c: &mut Criterion) {
    let data = vec![0xABu8; 1024 * 1024]; // 1 MiB

    let mut group = c.benchmark_group("hash_throughput");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for algo in HashAlgorithm::ALL {
        group.bench_function(format!("{algo}_1mib"), |b| {
            b.iter(|| Hasher::digest(black_box(algo), black_box(&data)))
        });
    }

    group.bench_function("sha256_reader_1mib", |b| {
        b.iter(|| digest_reader(black_box(HashAlgorithm::Sha256), black_box(data.as_slice())))
    });

    group.finish();
}

fn hex_encode(c: &mut Criterion) {
    let bytes = [0x5Au8; 64];

    let mut group = c.benchmark_group("hex");

    group.bench_function("encode_64bytes", |b| {
        b.iter(|| to_hex(black_box(&bytes)))
    });

    group.finish();
}

criterion_group!(benches, hash_throughput, hex_encode);
criterion_main!(benches);
