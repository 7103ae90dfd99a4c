//! Error taxonomy for the proof chain.
//!
//! Every failure the orchestration layer can report maps onto one variant here.
//! Parsing and shape errors are raised before the proof backend is touched.
//! A proof that decodes but does not check out is **not** an error: verifiers
//! return `Ok(false)` for it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::field::ScalarField;
use crate::types::{CircuitKind, TxId};

/// Errors surfaced by the proof chain and its collaborators.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Raw transaction is truncated or declares too few inputs.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    /// A byte region assigned to a circuit does not match the circuit's fixed length.
    #[error("witness shape mismatch for {region}: circuit expects {expected} bytes, got {actual}")]
    WitnessShapeMismatch {
        /// Which region of the assignment was rejected.
        region: &'static str,
        /// Length fixed by the circuit parameters.
        expected: usize,
        /// Length supplied by the caller.
        actual: usize,
    },

    /// A witness value is not a canonical residue of the field it is tagged with.
    #[error("{part} value #{index} ({value}) is not a canonical {field} residue")]
    NonCanonicalValue {
        /// Field the witness lives in.
        field: ScalarField,
        /// `public` or `secret`.
        part: &'static str,
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: u64,
    },

    /// A persisted circuit or key could not be read back.
    ///
    /// Requires operator intervention; the store never regenerates on its own.
    #[error("artifact {path} is corrupt: {reason}")]
    ArtifactCorrupt {
        /// Blob that failed to load.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A persisted artifact was set up for different circuit parameters.
    #[error("{kind} artifact was set up for {persisted}, requested {requested}")]
    ArtifactMismatch {
        /// Circuit kind of the artifact.
        kind: CircuitKind,
        /// Key recorded on disk.
        persisted: String,
        /// Key derived from the requested parameters.
        requested: String,
    },

    /// Caller-supplied serialized proof could not be decoded.
    #[error("proof decode error: {0}")]
    ProofDecode(String),

    /// The predecessor proof did not verify, so no proof was built on top of it.
    #[error("predecessor proof for {prev_tx_id} failed local verification")]
    PredecessorRejected {
        /// Identifier the predecessor proof was checked against.
        prev_tx_id: TxId,
    },

    /// The proving or verifying primitive itself failed.
    #[error("proof backend failure: {0}")]
    BackendFailure(String),

    /// Requested behaviour is outside the current contract.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying filesystem error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ChainError {
    /// Wrap a backend error, keeping its full context chain in the message.
    #[must_use]
    pub fn backend(err: &anyhow::Error) -> Self {
        Self::BackendFailure(format!("{err:#}"))
    }

    /// Shorthand for a corrupt artifact at `path`.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request could ever succeed.
    ///
    /// Only raw I/O errors are transient; every other class is permanent.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Result alias used across the workspace.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_keeps_context_chain() {
        let err = anyhow::anyhow!("pairing check").context("verify inner proof");
        let wrapped = ChainError::backend(&err);
        let msg = wrapped.to_string();
        assert!(msg.contains("verify inner proof"));
        assert!(msg.contains("pairing check"));
    }

    #[test]
    fn shape_mismatch_names_region() {
        let err = ChainError::WitnessShapeMismatch {
            region: "prefix",
            expected: 5,
            actual: 6,
        };
        assert_eq!(
            err.to_string(),
            "witness shape mismatch for prefix: circuit expects 5 bytes, got 6"
        );
        assert!(err.is_permanent());
    }
}
