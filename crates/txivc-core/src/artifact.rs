//! Circuit artifacts and the serialized proof envelope.
//!
//! [`Artifact`] bundles everything one circuit kind needs at runtime: the
//! compiled constraint system and its key pair, plus the [`ArtifactKey`] the
//! circuit was shaped by. Artifacts are created once, then shared read-only.
//!
//! [`ProofEnvelope`] is the stable boundary between the chain and its callers.
//! It pins the circuit kind next to the backend-opaque proof so that a proof
//! from one circuit is never checked against the other circuit's key.
//!
//! ## Backward/forward compatibility
//! - Do **not** add `#[serde(deny_unknown_fields)]` so newer producers with
//!   extra fields remain readable by older consumers.
//! - Bump [`ENVELOPE_VERSION`] when the meaning of an existing field changes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::ProofBackend;
use crate::error::{ChainError, ChainResult};
use crate::types::{ArtifactKey, CircuitKind};

/// Wire version written into every [`ProofEnvelope`].
pub const ENVELOPE_VERSION: u16 = 1;

/// Compiled circuit plus key pair for one circuit kind.
///
/// **Invariants**
/// - `pk` and `vk` were produced by a single `setup` call on `ccs`.
/// - Never mutated after construction; share it through `Arc`.
pub struct Artifact<B: ProofBackend> {
    /// Parameters the circuit was shaped by.
    pub key: ArtifactKey,
    /// Compiled circuit.
    pub ccs: B::ConstraintSystem,
    /// Proving key.
    pub pk: B::ProvingKey,
    /// Verifying key.
    pub vk: B::VerifyingKey,
}

impl<B: ProofBackend> Artifact<B> {
    /// Circuit kind of this artifact.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> CircuitKind {
        self.key.kind()
    }
}

impl<B: ProofBackend> std::fmt::Debug for Artifact<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Serialized proof handed to and received from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofEnvelope<P> {
    /// Wire version tag.
    pub version: u16,
    /// Circuit that produced `proof`.
    pub kind: CircuitKind,
    /// Backend-opaque proof.
    pub proof: P,
}

impl<P> ProofEnvelope<P> {
    /// Wrap a proof produced by circuit `kind`.
    #[inline]
    #[must_use]
    pub const fn new(kind: CircuitKind, proof: P) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            kind,
            proof,
        }
    }
}

impl<P: Serialize> ProofEnvelope<P> {
    /// Encode as compact JSON text.
    pub fn encode(&self) -> ChainResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ChainError::BackendFailure(format!("serialize proof envelope: {e}")))
    }
}

impl<P: DeserializeOwned> ProofEnvelope<P> {
    /// Decode JSON text produced by [`ProofEnvelope::encode`].
    pub fn decode(text: &str) -> ChainResult<Self> {
        let env: Self = serde_json::from_str(text.trim())
            .map_err(|e| ChainError::ProofDecode(e.to_string()))?;
        if env.version != ENVELOPE_VERSION {
            return Err(ChainError::ProofDecode(format!(
                "unsupported proof envelope version {} (expected {ENVELOPE_VERSION})",
                env.version
            )));
        }
        Ok(env)
    }
}
