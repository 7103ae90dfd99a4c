//! Shared fixtures: a sample transaction, a child spending it, and a backend
//! that counts calls.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use txivc_backend::{
    TranscriptBackend, TranscriptCcs, TranscriptPk, TranscriptProof, TranscriptVk,
};
use txivc_chain::{ArtifactStore, ChainContext};
use txivc_core::{CircuitDescription, CircuitParams, FullWitness, LightWitness, ProofBackend};
use txivc_crypto::tx_id;

/// Version 2, one input, two P2PKH outputs; 191 bytes.
pub const SAMPLE_TX_HEX: &str = "020000000190bc0a14e94cdd565265d79c4f9bed0f6404241f3fb69d6458b30b41611317f7000000004847304402204e643ff6ed0e3c3e1e83f3e2c74a9d0613849bb624c1d12351f1152cf91ebc1f02205deaa38e3f8f8e43d1979f999c03ffa65b9087c1a6545ecffa2b7898c042bcb241feffffff0200ca9a3b000000001976a914662db6c1a68cdf035bfb9c6580550eb3520caa9d88ac40276bee000000001976a9142dbbeab87bd7a8fca8b2761e5d798dfd76d5af4988ac6f000000";

/// Identifier of [`SAMPLE_TX_HEX`].
pub const SAMPLE_TX_ID: &str = "faf3013aab53ae122e6cfdef7720c7a785fed4ce7f8f3dd19379f31e62651c71";

pub fn sample_tx() -> Vec<u8> {
    hex::decode(SAMPLE_TX_HEX).unwrap()
}

/// Bounds that fit the sample transaction both as a base tx and as a child.
pub const fn params() -> CircuitParams {
    CircuitParams::new(191, 5, 154)
}

/// Same shape as the sample, but input 0 spends `parent`.
pub fn child_of(parent: &[u8]) -> Vec<u8> {
    let mut child = sample_tx();
    child[5..37].copy_from_slice(tx_id(parent).as_bytes());
    child
}

/// [`TranscriptBackend`] that counts setup, prove and verify calls.
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: TranscriptBackend,
    pub setups: AtomicUsize,
    pub proves: AtomicUsize,
    pub verifies: AtomicUsize,
}

impl CountingBackend {
    pub fn setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn proves(&self) -> usize {
        self.proves.load(Ordering::SeqCst)
    }

    pub fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

impl ProofBackend for CountingBackend {
    type ConstraintSystem = TranscriptCcs;
    type ProvingKey = TranscriptPk;
    type VerifyingKey = TranscriptVk;
    type Proof = TranscriptProof;

    fn compile(
        &self,
        circuit: &CircuitDescription<'_, TranscriptVk>,
    ) -> anyhow::Result<TranscriptCcs> {
        self.inner.compile(circuit)
    }

    fn setup(&self, ccs: &TranscriptCcs) -> anyhow::Result<(TranscriptPk, TranscriptVk)> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        self.inner.setup(ccs)
    }

    fn prove(
        &self,
        ccs: &TranscriptCcs,
        pk: &TranscriptPk,
        witness: &FullWitness,
    ) -> anyhow::Result<TranscriptProof> {
        self.proves.fetch_add(1, Ordering::SeqCst);
        self.inner.prove(ccs, pk, witness)
    }

    fn verify(
        &self,
        vk: &TranscriptVk,
        public: &LightWitness,
        proof: &TranscriptProof,
    ) -> anyhow::Result<bool> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(vk, public, proof)
    }

    fn recursion_input(
        &self,
        vk: &TranscriptVk,
        public: &LightWitness,
        proof: &TranscriptProof,
    ) -> anyhow::Result<Vec<u64>> {
        self.inner.recursion_input(vk, public, proof)
    }
}

/// Fresh counting backend plus a store over `dir`.
pub fn store(dir: &Path) -> (Arc<CountingBackend>, ArtifactStore<CountingBackend>) {
    let backend = Arc::new(CountingBackend::default());
    let store = ArtifactStore::new(dir, Arc::clone(&backend));
    (backend, store)
}

/// Bootstrapped context over `dir` with [`params`].
pub fn context(dir: &Path) -> (Arc<CountingBackend>, Arc<ChainContext<CountingBackend>>) {
    let (backend, store) = store(dir);
    let ctx = ChainContext::bootstrap(&store, params()).unwrap();
    (backend, Arc::new(ctx))
}
