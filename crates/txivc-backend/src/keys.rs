//! Key pair and proof objects of the transcript backend.
//!
//! Keys carry the digest of the circuit they were set up for and a 32-byte
//! secret drawn at setup time. A proof is a transcript tag over
//! `(circuit, secret, field, public values)`; only a holder of the matching
//! key can recompute it, so this is a designated-verifier scaffold.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use serde::{Deserialize, Serialize};
use txivc_core::ScalarField;
use txivc_crypto::{Blake3Transcript, Label, Transcript};

/// Domain separator for proof tags.
pub const DS_PROOF: &str = "txivc/proof/v1";

/// Proving key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptPk {
    /// Digest of the constraint system this key belongs to.
    pub circuit: [u8; 32],
    /// Field of the circuit.
    pub field: ScalarField,
    /// Number of public values the circuit exposes.
    pub n_public: usize,
    /// Setup secret.
    pub secret: [u8; 32],
}

/// Verifying key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptVk {
    /// Digest of the constraint system this key belongs to.
    pub circuit: [u8; 32],
    /// Field of the circuit.
    pub field: ScalarField,
    /// Number of public values the circuit exposes.
    pub n_public: usize,
    /// Setup secret.
    pub secret: [u8; 32],
}

/// Proof object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptProof {
    /// Digest of the circuit that produced the proof.
    pub circuit: [u8; 32],
    /// Transcript tag binding key, circuit and public values.
    pub tag: [u8; 32],
}

/// Recompute the tag for `public` under a key.
#[must_use]
pub fn proof_tag(
    circuit: &[u8; 32],
    secret: &[u8; 32],
    field: ScalarField,
    public: &[u64],
) -> [u8; 32] {
    let mut tr = Blake3Transcript::new(DS_PROOF);
    tr.absorb(Label::Circuit, circuit);
    tr.absorb(Label::Key, secret);
    tr.absorb(Label::Field, &[field.tag()]);
    tr.absorb_u64(Label::Public, public.len() as u64);
    for v in public {
        tr.absorb_u64(Label::Public, *v);
    }
    tr.challenge(Label::Tag)
}

impl TranscriptVk {
    /// Native verification of `proof` over `public`.
    #[must_use]
    pub fn check(&self, field: ScalarField, public: &[u64], proof: &TranscriptProof) -> bool {
        proof.circuit == self.circuit
            && field == self.field
            && public.len() == self.n_public
            && proof.tag == proof_tag(&self.circuit, &self.secret, field, public)
    }
}
