//! Request/response types for the proving and verification surface.
//!
//! Field names follow the established JSON wire (`raw_tx`, `input_index`,
//! `is_parent_base`, `txn_id`, `txnid`). Transactions and identifiers travel as
//! hex; proofs travel as the JSON text of a [`crate::ProofEnvelope`].

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, ChainResult};
use crate::types::{CircuitKind, TxId};

/// Create a base proof for a genesis transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseProofRequest {
    /// Hex-encoded raw transaction.
    pub raw_tx: String,
}

/// Create an inductive proof for a child transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalProofRequest {
    /// Hex-encoded raw child transaction.
    pub raw_tx: String,
    /// Input of the child that spends the predecessor.
    #[serde(default)]
    pub input_index: u64,
    /// Whether the predecessor proof is a base proof.
    #[serde(default = "default_true")]
    pub is_parent_base: bool,
    /// Serialized predecessor proof.
    pub proof: String,
}

const fn default_true() -> bool {
    true
}

/// A freshly created proof.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofResponse {
    /// Identifier of the proven transaction (hex).
    pub txn_id: String,
    /// Serialized proof.
    pub proof: String,
}

/// Verify a proof against a transaction identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyRequest {
    /// Transaction identifier (hex).
    pub txn_id: String,
    /// Serialized proof.
    pub proof: String,
    /// Which circuit the proof is claimed to come from.
    pub kind: CircuitKind,
}

/// Outcome of a verification; `verified: false` is a normal result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResult {
    /// Identifier the proof was checked against (hex).
    pub txnid: String,
    /// Whether the proof checked out.
    pub verified: bool,
}

/// Decode a hex-encoded raw transaction.
pub fn decode_raw_tx(hex_tx: &str) -> ChainResult<Vec<u8>> {
    hex::decode(hex_tx.trim())
        .map_err(|e| ChainError::MalformedTransaction(format!("raw tx is not hex: {e}")))
}

impl VerifyRequest {
    /// Parsed transaction identifier.
    pub fn tx_id(&self) -> ChainResult<TxId> {
        TxId::from_hex(&self.txn_id)
    }
}
