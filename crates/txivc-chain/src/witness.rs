//! Witness builder for the base and inductive circuits.
//!
//! Base witnesses live in the inner field; inductive witnesses live in the
//! outer field. The only place inner values cross into the outer field is
//! [`ProofBackend::recursion_input`], called from [`inductive_full_witness`].
//!
//! Every length check happens here, before the backend sees the assignment.

use txivc_core::{
    bytes_to_elements, ChainError, ChainResult, CircuitParams, FullWitness, LightWitness,
    ProofBackend, ScalarField, SlicedTransaction, TxId,
};

/// A verified-or-to-be-verified predecessor: its public witness, proof and key.
pub struct PredecessorLink<'a, B: ProofBackend> {
    /// Public witness the proof was made against.
    pub light: &'a LightWitness,
    /// Predecessor proof.
    pub proof: &'a B::Proof,
    /// Verifying key of the predecessor's circuit.
    pub vk: &'a B::VerifyingKey,
}

/// Base-circuit assignment: public = `tx_id`, secret = `raw`.
pub fn base_full_witness(
    params: &CircuitParams,
    raw: &[u8],
    tx_id: &TxId,
) -> ChainResult<FullWitness> {
    ensure_len("raw_tx", params.tx_bytes, raw.len())?;
    FullWitness::new(
        ScalarField::Inner,
        bytes_to_elements(tx_id.as_bytes()),
        bytes_to_elements(raw),
    )
}

/// Public part of a base-circuit assignment for `tx_id`.
pub fn base_light_witness(tx_id: &TxId) -> ChainResult<LightWitness> {
    LightWitness::new(ScalarField::Inner, bytes_to_elements(tx_id.as_bytes()))
}

/// Public part of a normal-circuit assignment for `tx_id`.
pub fn normal_light_witness(tx_id: &TxId) -> ChainResult<LightWitness> {
    LightWitness::new(ScalarField::Outer, bytes_to_elements(tx_id.as_bytes()))
}

/// Normal-circuit assignment.
///
/// Secret layout: `recursion_input(predecessor) ++ prefix ++ linked_id ++ postfix`.
/// Public: `curr_tx_id`.
pub fn inductive_full_witness<B: ProofBackend>(
    backend: &B,
    params: &CircuitParams,
    predecessor: &PredecessorLink<'_, B>,
    sliced: &SlicedTransaction,
    curr_tx_id: &TxId,
) -> ChainResult<FullWitness> {
    check_slice_shape(params, sliced)?;

    let recursion = backend
        .recursion_input(predecessor.vk, predecessor.light, predecessor.proof)
        .map_err(|e| ChainError::backend(&e))?;
    if let Some(v) = recursion
        .iter()
        .find(|v| !ScalarField::Outer.is_canonical(**v))
    {
        return Err(ChainError::BackendFailure(format!(
            "field conversion produced non-canonical outer value {v}"
        )));
    }

    let mut secret = recursion;
    secret.reserve(sliced.len());
    secret.extend(bytes_to_elements(&sliced.prefix));
    secret.extend(bytes_to_elements(sliced.linked_id.as_bytes()));
    secret.extend(bytes_to_elements(&sliced.postfix));

    FullWitness::new(
        ScalarField::Outer,
        bytes_to_elements(curr_tx_id.as_bytes()),
        secret,
    )
}

/// Reject a slice whose prefix/postfix lengths differ from the normal circuit's.
pub fn check_slice_shape(params: &CircuitParams, sliced: &SlicedTransaction) -> ChainResult<()> {
    ensure_len("prefix", params.prefix_bytes, sliced.prefix.len())?;
    ensure_len("postfix", params.postfix_bytes, sliced.postfix.len())
}

fn ensure_len(region: &'static str, expected: usize, actual: usize) -> ChainResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ChainError::WitnessShapeMismatch {
            region,
            expected,
            actual,
        })
    }
}
