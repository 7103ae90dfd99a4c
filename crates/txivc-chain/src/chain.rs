//! Proof-chain orchestrator.
//!
//! Two states. A **base** link proves that `tx_id = sha256d(raw)` for a
//! genesis transaction. An **inductive** link slices the child transaction,
//! checks the predecessor's base proof against the linked identifier, and
//! proves the child inside the normal circuit that re-verifies that proof.
//!
//! ```text
//! raw ──► sha256d ──► base witness ──► prove(base) ──► P0
//! raw' ─► slice ─► linked id ─► verify(P0) ─► inductive witness ─► prove(normal) ──► P1
//! ```
//!
//! Nothing here mutates persisted state: artifacts are resolved once into a
//! [`ChainContext`] and then only read.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use txivc_core::api::{decode_raw_tx, BaseProofRequest, NormalProofRequest, ProofResponse};
use txivc_core::{
    Artifact, ChainError, ChainResult, CircuitKind, CircuitParams, ProofBackend, ProofEnvelope,
    TxId,
};
use txivc_crypto::tx_id;

use crate::config::ChainConfig;
use crate::store::ArtifactStore;
use crate::tx::slice_tx;
use crate::witness::{
    base_full_witness, base_light_witness, check_slice_shape, inductive_full_witness,
    PredecessorLink,
};

/// Immutable, shareable state every request reads: backend, bounds, artifacts.
pub struct ChainContext<B: ProofBackend> {
    backend: Arc<B>,
    params: CircuitParams,
    base: Arc<Artifact<B>>,
    normal: Arc<Artifact<B>>,
}

impl<B: ProofBackend> std::fmt::Debug for ChainContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("params", &self.params)
            .field("base", &self.base)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

impl<B: ProofBackend> ChainContext<B> {
    /// Resolve both artifacts through `store`, setting them up if absent.
    pub fn bootstrap(store: &ArtifactStore<B>, params: CircuitParams) -> ChainResult<Self> {
        params.validate()?;
        let base = store.load_or_create_base(&params)?;
        let normal = store.load_or_create_normal(&params, &base)?;
        Ok(Self {
            backend: Arc::clone(store.backend()),
            params,
            base,
            normal,
        })
    }

    /// Bootstrap from a loaded configuration.
    pub fn from_config(backend: Arc<B>, cfg: &ChainConfig) -> ChainResult<Self> {
        let store = ArtifactStore::new(cfg.artifact_dir.clone(), backend);
        Self::bootstrap(&store, cfg.params())
    }

    /// Proof backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Circuit bounds.
    #[must_use]
    pub const fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// Base-circuit artifact.
    #[must_use]
    pub fn base(&self) -> &Artifact<B> {
        &self.base
    }

    /// Normal-circuit artifact.
    #[must_use]
    pub fn normal(&self) -> &Artifact<B> {
        &self.normal
    }

    /// Artifact for `kind`.
    #[must_use]
    pub fn artifact(&self, kind: CircuitKind) -> &Artifact<B> {
        match kind {
            CircuitKind::Base => &self.base,
            CircuitKind::Normal => &self.normal,
        }
    }
}

/// One link to prove.
#[derive(Clone, Copy, Debug)]
pub enum Link<'a> {
    /// Genesis transaction.
    Base {
        /// Raw transaction bytes.
        raw: &'a [u8],
    },
    /// Child transaction spending a proven predecessor.
    Inductive {
        /// Raw child transaction bytes.
        raw: &'a [u8],
        /// Input of the child that spends the predecessor.
        input_index: u64,
        /// Serialized predecessor proof.
        predecessor_proof: &'a str,
        /// Whether the predecessor proof came from the base circuit.
        predecessor_is_base: bool,
    },
}

/// A proven link: identifier plus serialized proof envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvedLink {
    /// Identifier of the proven transaction.
    pub tx_id: TxId,
    /// JSON text of the proof envelope.
    pub proof: String,
}

impl From<ProvedLink> for ProofResponse {
    fn from(p: ProvedLink) -> Self {
        Self {
            txn_id: p.tx_id.to_hex(),
            proof: p.proof,
        }
    }
}

/// Base/inductive prover over a shared [`ChainContext`].
pub struct ProofChain<B: ProofBackend> {
    ctx: Arc<ChainContext<B>>,
}

impl<B: ProofBackend> Clone for ProofChain<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<B: ProofBackend> ProofChain<B> {
    /// Prover over `ctx`.
    #[must_use]
    pub const fn new(ctx: Arc<ChainContext<B>>) -> Self {
        Self { ctx }
    }

    /// Shared context.
    #[must_use]
    pub fn context(&self) -> &Arc<ChainContext<B>> {
        &self.ctx
    }

    /// Prove one link.
    pub fn prove(&self, link: Link<'_>) -> ChainResult<ProvedLink> {
        match link {
            Link::Base { raw } => self.prove_base(raw),
            Link::Inductive {
                raw,
                input_index,
                predecessor_proof,
                predecessor_is_base,
            } => self.prove_inductive(raw, input_index, predecessor_proof, predecessor_is_base),
        }
    }

    /// Prove a genesis transaction with the base circuit.
    pub fn prove_base(&self, raw: &[u8]) -> ChainResult<ProvedLink> {
        let ctx = &*self.ctx;
        let id = tx_id(raw);
        let witness = base_full_witness(&ctx.params, raw, &id)?;

        let t0 = Instant::now();
        let proof = ctx
            .backend
            .prove(&ctx.base.ccs, &ctx.base.pk, &witness)
            .map_err(|e| ChainError::backend(&e))?;
        info!(tx_id = %id, elapsed_ms = t0.elapsed().as_millis(), "base proof created");

        Ok(ProvedLink {
            tx_id: id,
            proof: ProofEnvelope::new(CircuitKind::Base, proof).encode()?,
        })
    }

    /// Prove a child transaction on top of a base proof of its predecessor.
    ///
    /// The predecessor proof is verified locally first; if it does not check
    /// out, [`ChainError::PredecessorRejected`] is returned and nothing is proven.
    pub fn prove_inductive(
        &self,
        raw: &[u8],
        input_index: u64,
        predecessor_proof: &str,
        predecessor_is_base: bool,
    ) -> ChainResult<ProvedLink> {
        if !predecessor_is_base {
            return Err(ChainError::NotImplemented(
                "inductive step over a non-base predecessor",
            ));
        }
        let ctx = &*self.ctx;

        let sliced = slice_tx(raw, input_index)?;
        check_slice_shape(&ctx.params, &sliced)?;
        let id = tx_id(raw);
        let prev_id = sliced.linked_id;
        debug!(tx_id = %id, %prev_id, input_index, "sliced child transaction");

        let envelope = ProofEnvelope::<B::Proof>::decode(predecessor_proof)?;
        if envelope.kind != CircuitKind::Base {
            warn!(%prev_id, kind = %envelope.kind, "predecessor proof is not a base proof");
            return Err(ChainError::PredecessorRejected {
                prev_tx_id: prev_id,
            });
        }

        let light = base_light_witness(&prev_id)?;
        let accepted = ctx
            .backend
            .verify(&ctx.base.vk, &light, &envelope.proof)
            .map_err(|e| ChainError::backend(&e))?;
        if !accepted {
            warn!(%prev_id, "predecessor proof failed local verification");
            return Err(ChainError::PredecessorRejected {
                prev_tx_id: prev_id,
            });
        }

        let predecessor = PredecessorLink::<B> {
            light: &light,
            proof: &envelope.proof,
            vk: &ctx.base.vk,
        };
        let witness =
            inductive_full_witness(&*ctx.backend, &ctx.params, &predecessor, &sliced, &id)?;

        let t0 = Instant::now();
        let proof = ctx
            .backend
            .prove(&ctx.normal.ccs, &ctx.normal.pk, &witness)
            .map_err(|e| ChainError::backend(&e))?;
        info!(tx_id = %id, %prev_id, elapsed_ms = t0.elapsed().as_millis(), "normal proof created");

        Ok(ProvedLink {
            tx_id: id,
            proof: ProofEnvelope::new(CircuitKind::Normal, proof).encode()?,
        })
    }

    /// Handle a base proof request.
    pub fn handle_base(&self, req: &BaseProofRequest) -> ChainResult<ProofResponse> {
        let raw = decode_raw_tx(&req.raw_tx)?;
        self.prove(Link::Base { raw: &raw }).map(Into::into)
    }

    /// Handle an inductive proof request.
    pub fn handle_normal(&self, req: &NormalProofRequest) -> ChainResult<ProofResponse> {
        let raw = decode_raw_tx(&req.raw_tx)?;
        self.prove(Link::Inductive {
            raw: &raw,
            input_index: req.input_index,
            predecessor_proof: &req.proof,
            predecessor_is_base: req.is_parent_base,
        })
        .map(Into::into)
    }
}
