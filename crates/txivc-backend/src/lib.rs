//! TXIVC reference proof backend.
//!
//! [`TranscriptBackend`] implements [`txivc_core::ProofBackend`] with a small
//! transcript scaffold instead of a pairing-based SNARK:
//!
//! - `compile` fixes the circuit layout, field and value counts and digests them;
//! - `setup` draws a fresh 32-byte secret, so two setups on the same circuit
//!   yield unrelated keys (proofs under one never verify under the other);
//! - `prove` evaluates the circuit relation, including native verification of
//!   the embedded base proof for the normal circuit, and emits a transcript tag;
//! - `verify` recomputes the tag.
//!
//! It is meant for plumbing and integration tests, not cryptographic security:
//! the verifying key holds the setup secret (designated verifier) and proofs are
//! not zero-knowledge. A production backend slots in behind the same trait.

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

/// Constraint systems and relations.
pub mod circuit;
/// Keys and proofs.
pub mod keys;

use anyhow::{ensure, Context, Result};
use rand::RngCore;
use txivc_core::{
    bytes_to_elements, lift_to_outer, CircuitDescription, FullWitness, InnerScalar,
    LightWitness, ProofBackend, ScalarField,
};

pub use crate::circuit::{Layout, TranscriptCcs};
pub use crate::keys::{TranscriptPk, TranscriptProof, TranscriptVk};

/// Transcript-scaffold backend over the inner/outer field cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptBackend;

impl TranscriptBackend {
    /// Construct the backend.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProofBackend for TranscriptBackend {
    type ConstraintSystem = TranscriptCcs;
    type ProvingKey = TranscriptPk;
    type VerifyingKey = TranscriptVk;
    type Proof = TranscriptProof;

    fn compile(&self, circuit: &CircuitDescription<'_, TranscriptVk>) -> Result<TranscriptCcs> {
        let layout = match circuit {
            CircuitDescription::Base { tx_bytes } => Layout::Base {
                tx_bytes: *tx_bytes,
            },
            CircuitDescription::Normal {
                prefix_bytes,
                postfix_bytes,
                inner_vk,
            } => Layout::Normal {
                prefix_bytes: *prefix_bytes,
                postfix_bytes: *postfix_bytes,
                inner_vk: (*inner_vk).clone(),
            },
        };
        TranscriptCcs::new(circuit.field(), layout)
            .with_context(|| format!("compile {} circuit", circuit.kind()))
    }

    fn setup(&self, ccs: &TranscriptCcs) -> Result<(TranscriptPk, TranscriptVk)> {
        ensure!(
            ccs.digest == ccs.compute_digest()?,
            "constraint system digest does not match its contents"
        );
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        let pk = TranscriptPk {
            circuit: ccs.digest,
            field: ccs.field,
            n_public: ccs.n_public,
            secret,
        };
        let vk = TranscriptVk {
            circuit: ccs.digest,
            field: ccs.field,
            n_public: ccs.n_public,
            secret,
        };
        Ok((pk, vk))
    }

    fn prove(
        &self,
        ccs: &TranscriptCcs,
        pk: &TranscriptPk,
        witness: &FullWitness,
    ) -> Result<TranscriptProof> {
        ensure!(
            pk.circuit == ccs.digest,
            "proving key does not belong to this constraint system"
        );
        ccs.check_relation(witness)?;
        Ok(TranscriptProof {
            circuit: pk.circuit,
            tag: keys::proof_tag(&pk.circuit, &pk.secret, witness.field(), witness.public()),
        })
    }

    fn verify(
        &self,
        vk: &TranscriptVk,
        public: &LightWitness,
        proof: &TranscriptProof,
    ) -> Result<bool> {
        Ok(vk.check(public.field(), public.public(), proof))
    }

    fn recursion_input(
        &self,
        vk: &TranscriptVk,
        public: &LightWitness,
        proof: &TranscriptProof,
    ) -> Result<Vec<u64>> {
        ensure!(
            vk.field == ScalarField::Inner && public.field() == ScalarField::Inner,
            "recursion input converts inner-field values only"
        );
        let mut out = Vec::with_capacity(circuit::recursion_len(public.len()));
        out.extend(bytes_to_elements(&vk.circuit));
        out.extend(bytes_to_elements(&vk.secret));
        for v in public.public() {
            let x = InnerScalar::from_canonical(*v)
                .with_context(|| format!("public value {v} is not a canonical inner residue"))?;
            out.push(lift_to_outer(x).value());
        }
        out.extend(bytes_to_elements(&proof.circuit));
        out.extend(bytes_to_elements(&proof.tag));
        Ok(out)
    }
}
