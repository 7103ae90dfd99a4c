use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use txivc_backend::TranscriptBackend;
use txivc_chain::{slice_tx, ArtifactStore, ChainContext, ProofChain, Verifier};
use txivc_core::CircuitParams;
use txivc_crypto::tx_id;

const SAMPLE_TX_HEX: &str = "020000000190bc0a14e94cdd565265d79c4f9bed0f6404241f3fb69d6458b30b41611317f7000000004847304402204e643ff6ed0e3c3e1e83f3e2c74a9d0613849bb624c1d12351f1152cf91ebc1f02205deaa38e3f8f8e43d1979f999c03ffa65b9087c1a6545ecffa2b7898c042bcb241feffffff0200ca9a3b000000001976a914662db6c1a68cdf035bfb9c6580550eb3520caa9d88ac40276bee000000001976a9142dbbeab87bd7a8fca8b2761e5d798dfd76d5af4988ac6f000000";

/// Deterministic tx with `n` empty-script inputs; returns bytes only.
fn det_tx(n: u8) -> Vec<u8> {
    let mut raw = vec![2, 0, 0, 0, n];
    for i in 0..n {
        raw.extend_from_slice(&[i; 32]);
        raw.extend_from_slice(&[0, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
    }
    raw.extend_from_slice(&[0; 4]);
    raw
}

fn bench_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice_tx");
    for &n in &[1u8, 16, 200] {
        let raw = det_tx(n);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_function(BenchmarkId::new("last_input", n), |b| {
            b.iter(|| slice_tx(black_box(&raw), u64::from(n - 1)).unwrap());
        });
    }
    group.finish();
}

fn bench_prove(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path(), Arc::new(TranscriptBackend::new()));
    let ctx = Arc::new(ChainContext::bootstrap(&store, CircuitParams::new(191, 5, 154)).unwrap());
    let prover = ProofChain::new(Arc::clone(&ctx));
    let verifier = Verifier::new(ctx);

    let t0 = hex::decode(SAMPLE_TX_HEX).unwrap();
    let mut t1 = t0.clone();
    t1[5..37].copy_from_slice(tx_id(&t0).as_bytes());
    let p0 = prover.prove_base(&t0).unwrap();

    let mut group = c.benchmark_group("proof_chain");
    group.bench_function("prove_base", |b| {
        b.iter(|| prover.prove_base(black_box(&t0)).unwrap());
    });
    group.bench_function("prove_inductive", |b| {
        b.iter(|| {
            prover
                .prove_inductive(black_box(&t1), 0, &p0.proof, true)
                .unwrap()
        });
    });
    group.bench_function("verify_base", |b| {
        b.iter(|| verifier.verify_base(&p0.tx_id, black_box(&p0.proof)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_slice, bench_prove);
criterion_main!(benches);
