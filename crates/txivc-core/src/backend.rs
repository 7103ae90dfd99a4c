//! Backend abstraction for compiling, setting up, proving and verifying.
//!
//! Orchestration code depends only on this trait and on the small closed set of
//! associated types it names. Backend-internal representations never leak out.
//!
//! ## Contracts implementors should uphold
//! - `setup` draws fresh randomness: two calls on the same constraint system
//!   must produce unrelated key pairs. Callers are responsible for running it
//!   at most once per circuit shape.
//! - `prove` must fail (not produce a proof) when the witness does not satisfy
//!   the circuit.
//! - `verify` returns `Ok(false)` for a proof that does not check out. `Err`
//!   is reserved for failures of the primitive itself.
//! - `recursion_input` converts an inner-field (vk, public witness, proof)
//!   triple into outer-field values exactly, without rounding or reduction.
//! - Nothing should panic on malformed inputs; return `Err` instead.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::field::ScalarField;
use crate::types::{CircuitKind, CircuitParams};
use crate::witness::{FullWitness, LightWitness};

/// Circuit to compile, with the structural parameters that shape it.
#[derive(Debug)]
pub enum CircuitDescription<'a, VK> {
    /// Base predicate: the public id is the double SHA-256 of `tx_bytes` secret bytes.
    Base {
        /// Exact transaction length.
        tx_bytes: usize,
    },
    /// Inductive step: recursively verify a base proof under `inner_vk`, then
    /// hash `prefix ++ linked_id ++ postfix` to the public id.
    Normal {
        /// Exact prefix length.
        prefix_bytes: usize,
        /// Exact postfix length.
        postfix_bytes: usize,
        /// Base verifying key fixed as a circuit constant.
        inner_vk: &'a VK,
    },
}

impl<'a, VK> CircuitDescription<'a, VK> {
    /// Base circuit for `params`.
    #[must_use]
    pub const fn base(params: &CircuitParams) -> Self {
        Self::Base {
            tx_bytes: params.tx_bytes,
        }
    }

    /// Normal circuit for `params`, embedding `inner_vk`.
    #[must_use]
    pub const fn normal(params: &CircuitParams, inner_vk: &'a VK) -> Self {
        Self::Normal {
            prefix_bytes: params.prefix_bytes,
            postfix_bytes: params.postfix_bytes,
            inner_vk,
        }
    }

    /// Which circuit this is.
    #[must_use]
    pub const fn kind(&self) -> CircuitKind {
        match self {
            Self::Base { .. } => CircuitKind::Base,
            Self::Normal { .. } => CircuitKind::Normal,
        }
    }

    /// Field the circuit is defined over.
    #[must_use]
    pub const fn field(&self) -> ScalarField {
        match self {
            Self::Base { .. } => ScalarField::Inner,
            Self::Normal { .. } => ScalarField::Outer,
        }
    }
}

/// Minimal proof-system API the rest of the system depends on.
///
/// Backends are shared read-only across requests, hence `Send + Sync`.
pub trait ProofBackend: Send + Sync {
    /// Compiled circuit.
    type ConstraintSystem: Clone + Serialize + DeserializeOwned + Send + Sync;
    /// Proving key produced by setup.
    type ProvingKey: Clone + Serialize + DeserializeOwned + Send + Sync;
    /// Verifying key produced by setup.
    type VerifyingKey: Clone + Serialize + DeserializeOwned + Send + Sync;
    /// Proof value.
    type Proof: Clone + Serialize + DeserializeOwned + Send + Sync;

    /// Compile a circuit description into a constraint system.
    fn compile(
        &self,
        circuit: &CircuitDescription<'_, Self::VerifyingKey>,
    ) -> Result<Self::ConstraintSystem>;

    /// Generate a fresh key pair for `ccs`.
    fn setup(
        &self,
        ccs: &Self::ConstraintSystem,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey)>;

    /// Prove that `witness` satisfies `ccs`.
    fn prove(
        &self,
        ccs: &Self::ConstraintSystem,
        pk: &Self::ProvingKey,
        witness: &FullWitness,
    ) -> Result<Self::Proof>;

    /// Check `proof` against the public values in `public`.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        public: &LightWitness,
        proof: &Self::Proof,
    ) -> Result<bool>;

    /// Express an inner-field (vk, public witness, proof) triple as outer-field
    /// values for the recursive verifier gadget.
    fn recursion_input(
        &self,
        vk: &Self::VerifyingKey,
        public: &LightWitness,
        proof: &Self::Proof,
    ) -> Result<Vec<u64>>;
}
