// crates/txivc-crypto/src/lib.rs

//! Crypto substrate: transaction identifiers and a Blake3 transcript.
//!
//! - [`tx_id`]: double SHA-256 of raw transaction bytes, the identifier every
//!   circuit in the chain commits to.
//! - [`Blake3Transcript`]: deterministic, domain-separated absorb/challenge API
//!   used by the reference backend to bind keys, circuits and public values.
//!
//! ⚠️ **Security note:** the transcript models a random oracle for scaffolding;
//! it is **not** a final protocol design.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use blake3::Hasher;
use sha2::{Digest, Sha256};
use txivc_core::TxId;

/// Context string for BLAKE3 key derivation; every transcript domain is keyed off it.
const TRANSCRIPT_CONTEXT: &str = "txivc 2024 transcript v1";

/// SHA-256 applied twice.
#[inline]
#[must_use]
pub fn sha256d(bytes: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(bytes);
    Sha256::digest(first).into()
}

/// Identifier of a raw transaction.
#[inline]
#[must_use]
pub fn tx_id(raw_tx: &[u8]) -> TxId {
    TxId(sha256d(raw_tx))
}

/// BLAKE3 digest of arbitrary bytes (artifact sealing, key fingerprints).
#[inline]
#[must_use]
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    *blake3::hash(bytes).as_bytes()
}

/// Labels a transcript absorbs and squeezes under.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Label {
    /// Circuit digest.
    Circuit = 1,
    /// Setup secret.
    Key = 2,
    /// Scalar field tag.
    Field = 3,
    /// Public witness values.
    Public = 4,
    /// Final proof tag.
    Tag = 5,
}

/// Absorb/squeeze interface used by backends.
pub trait Transcript {
    /// Absorb `bytes` under `label`.
    fn absorb(&mut self, label: Label, bytes: &[u8]);

    /// Absorb a `u64` (little-endian).
    fn absorb_u64(&mut self, label: Label, x: u64) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Squeeze a 32-byte challenge under `label`; later challenges depend on it.
    #[must_use]
    fn challenge(&mut self, label: Label) -> [u8; 32];
}

/// BLAKE3 transcript in key-derivation mode.
///
/// Every operation is framed as `op | label | len (u64 LE) | bytes`, so no two
/// distinct absorb sequences hash the same input.
#[derive(Clone, Debug)]
pub struct Blake3Transcript {
    st: Hasher,
}

const OP_DOMAIN: u8 = 0x00;
const OP_ABSORB: u8 = 0x01;
const OP_CHALLENGE: u8 = 0x02;
const OP_RATCHET: u8 = 0x03;

impl Blake3Transcript {
    /// Fresh transcript for `domain`.
    #[must_use]
    pub fn new(domain: &str) -> Self {
        let mut t = Self {
            st: Hasher::new_derive_key(TRANSCRIPT_CONTEXT),
        };
        t.frame(OP_DOMAIN, 0, domain.as_bytes());
        t
    }

    fn frame(&mut self, op: u8, label: u8, bytes: &[u8]) {
        self.st.update(&[op, label]);
        self.st.update(&(bytes.len() as u64).to_le_bytes());
        self.st.update(bytes);
    }
}

impl Transcript for Blake3Transcript {
    fn absorb(&mut self, label: Label, bytes: &[u8]) {
        self.frame(OP_ABSORB, label as u8, bytes);
    }

    fn challenge(&mut self, label: Label) -> [u8; 32] {
        let mut fork = self.st.clone();
        fork.update(&[OP_CHALLENGE, label as u8]);
        let out = *fork.finalize().as_bytes();
        self.frame(OP_RATCHET, label as u8, &out);
        out
    }
}
