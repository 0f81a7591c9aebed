use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{HashFunction, Miner, Sha1Hasher, Timestamp, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow");
    group.sample_size(10);

    group.bench_function("mine_block_sha1", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        let tx = Transaction::new("bitcoin", "alice", rng.gen_range(1..100)).unwrap();
        let timestamp = Timestamp::now();
        let mut miner = Miner::seeded(42);

        b.iter(|| {
            let _mined = miner
                .mine_block(0, timestamp, tx.clone(), "00000", &Sha1Hasher)
                .unwrap();
        });
    });

    group.bench_function("sha1_digest", |b| {
        let input = "2020-09-13 12:26:40.123:bitcoin:alice=100.a!b00000";
        b.iter(|| Sha1Hasher.digest(input));
    });

    group.finish();
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
