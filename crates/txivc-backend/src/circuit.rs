//! Constraint systems of the transcript backend and their relations.
//!
//! A constraint system records the circuit layout, the field it runs over and
//! the exact number of public/secret values, plus a digest binding all of it.
//! `check_*` functions evaluate the relation on an assignment; an unsatisfied
//! relation is an error, exactly like an unsatisfiable witness in a SNARK.
//!
//! Normal-circuit secret layout (all outer-field values):
//!
//! ```text
//! [ vk.circuit (32) | vk.secret (32) | inner public (n) | proof.circuit (32) | proof.tag (32)
//!   | prefix (prefix_bytes) | linked id (32) | postfix (postfix_bytes) ]
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use txivc_core::{FullWitness, InnerScalar, ScalarField, TX_ID_LEN};
use txivc_crypto::{digest, sha256d};

use crate::keys::{TranscriptProof, TranscriptVk};

/// Constraint-system format version.
pub const CCS_VERSION: u16 = 1;

/// Number of recursion-input values for an inner key exposing `n_public` values.
#[inline]
#[must_use]
pub const fn recursion_len(n_public: usize) -> usize {
    32 + 32 + n_public + 32 + 32
}

/// Circuit-specific layout.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Layout {
    /// Public id = sha256d(secret bytes).
    Base {
        /// Exact transaction length.
        tx_bytes: usize,
    },
    /// Recursive check of a base proof, then public id = sha256d(prefix ++ id ++ postfix).
    Normal {
        /// Exact prefix length.
        prefix_bytes: usize,
        /// Exact postfix length.
        postfix_bytes: usize,
        /// Embedded base verifying key (circuit constant).
        inner_vk: TranscriptVk,
    },
}

/// Compiled circuit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptCcs {
    /// Format version.
    pub version: u16,
    /// Field the circuit runs over.
    pub field: ScalarField,
    /// Layout and constants.
    pub layout: Layout,
    /// Public value count.
    pub n_public: usize,
    /// Secret value count.
    pub n_secret: usize,
    /// Digest over all of the above.
    pub digest: [u8; 32],
}

impl TranscriptCcs {
    /// Build a constraint system and compute its digest.
    pub fn new(field: ScalarField, layout: Layout) -> Result<Self> {
        let n_public = TX_ID_LEN;
        let n_secret = match &layout {
            Layout::Base { tx_bytes } => {
                ensure!(*tx_bytes > 0, "base circuit needs a positive tx length");
                *tx_bytes
            }
            Layout::Normal {
                prefix_bytes,
                postfix_bytes,
                inner_vk,
            } => {
                ensure!(
                    inner_vk.field == ScalarField::Inner,
                    "normal circuit can only embed an inner-field verifying key"
                );
                recursion_len(inner_vk.n_public) + prefix_bytes + TX_ID_LEN + postfix_bytes
            }
        };
        let mut ccs = Self {
            version: CCS_VERSION,
            field,
            layout,
            n_public,
            n_secret,
            digest: [0u8; 32],
        };
        ccs.digest = ccs.compute_digest()?;
        Ok(ccs)
    }

    /// Digest over the canonical encoding with `digest` zeroed.
    pub fn compute_digest(&self) -> Result<[u8; 32]> {
        let mut canon = self.clone();
        canon.digest = [0u8; 32];
        let bytes = bincode::serialize(&canon).context("encode constraint system")?;
        let mut tagged = b"txivc/ccs/v1".to_vec();
        tagged.extend_from_slice(&bytes);
        Ok(digest(&tagged))
    }

    /// Reject an assignment whose shape does not match this circuit.
    pub fn check_shape(&self, witness: &FullWitness) -> Result<()> {
        ensure!(
            witness.field() == self.field,
            "witness is over the {} field, circuit over {}",
            witness.field(),
            self.field
        );
        ensure!(
            witness.public().len() == self.n_public,
            "circuit expects {} public values, got {}",
            self.n_public,
            witness.public().len()
        );
        ensure!(
            witness.secret().len() == self.n_secret,
            "circuit expects {} secret values, got {}",
            self.n_secret,
            witness.secret().len()
        );
        Ok(())
    }

    /// Evaluate the circuit relation on `witness`.
    pub fn check_relation(&self, witness: &FullWitness) -> Result<()> {
        self.check_shape(witness)?;
        let public = to_bytes(witness.public()).context("public id")?;
        match &self.layout {
            Layout::Base { .. } => {
                let raw = to_bytes(witness.secret()).context("raw transaction")?;
                ensure!(
                    sha256d(&raw)[..] == public[..],
                    "constraint not satisfied: sha256d(raw tx) != public tx id"
                );
            }
            Layout::Normal {
                prefix_bytes,
                postfix_bytes,
                inner_vk,
            } => {
                let rec_len = recursion_len(inner_vk.n_public);
                let (rec, tx) = witness.secret().split_at(rec_len);
                let (vk_circuit, vk_secret, inner_public, proof) =
                    split_recursion(rec, inner_vk.n_public)?;

                ensure!(
                    vk_circuit == inner_vk.circuit && vk_secret == inner_vk.secret,
                    "constraint not satisfied: recursive verifier key differs from the embedded key"
                );
                ensure!(
                    inner_vk.check(ScalarField::Inner, &inner_public, &proof),
                    "constraint not satisfied: inner proof does not verify"
                );

                let tx = to_bytes(tx).context("child transaction")?;
                let linked = &tx[*prefix_bytes..*prefix_bytes + TX_ID_LEN];
                let inner_id = to_bytes(&inner_public).context("inner public id")?;
                ensure!(
                    inner_id == linked,
                    "constraint not satisfied: inner public id != linked id"
                );
                debug_assert_eq!(tx.len(), prefix_bytes + TX_ID_LEN + postfix_bytes);
                ensure!(
                    sha256d(&tx)[..] == public[..],
                    "constraint not satisfied: sha256d(prefix ++ id ++ postfix) != public tx id"
                );
            }
        }
        Ok(())
    }
}

/// Decode the recursion section back into `(vk.circuit, vk.secret, inner public, proof)`.
///
/// Inner public values must come back as canonical inner residues; anything
/// else means the conversion was not exact.
fn split_recursion(
    rec: &[u64],
    n_public: usize,
) -> Result<([u8; 32], [u8; 32], Vec<u64>, TranscriptProof)> {
    ensure!(rec.len() == recursion_len(n_public), "recursion input length");
    let (vk_circuit, rest) = rec.split_at(32);
    let (vk_secret, rest) = rest.split_at(32);
    let (public, rest) = rest.split_at(n_public);
    let (p_circuit, p_tag) = rest.split_at(32);

    let mut inner_public = Vec::with_capacity(n_public);
    for v in public {
        match InnerScalar::from_canonical(*v) {
            Some(x) => inner_public.push(x.value()),
            None => bail!("recursion input value {v} is outside the inner field"),
        }
    }

    Ok((
        to_array(vk_circuit)?,
        to_array(vk_secret)?,
        inner_public,
        TranscriptProof {
            circuit: to_array(p_circuit)?,
            tag: to_array(p_tag)?,
        },
    ))
}

/// Values that encode bytes, back to bytes.
pub fn to_bytes(values: &[u64]) -> Result<Vec<u8>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| u8::try_from(*v).with_context(|| format!("value #{i} ({v}) is not a byte")))
        .collect()
}

fn to_array(values: &[u64]) -> Result<[u8; 32]> {
    let bytes = to_bytes(values)?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("expected 32 bytes, got {}", b.len()))
}
