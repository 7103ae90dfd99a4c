//! Verification dispatch.
//!
//! Rebuilds the light witness for a transaction id in the field of the claimed
//! circuit and asks the backend to check the proof. Malformed proof text is an
//! error; a well-formed proof that does not check out, including one produced
//! by the other circuit, is `Ok(false)`.

use std::sync::Arc;

use tracing::debug;
use txivc_core::api::{VerifyRequest, VerifyResult};
use txivc_core::{ChainError, ChainResult, CircuitKind, ProofBackend, ProofEnvelope, TxId};

use crate::chain::ChainContext;
use crate::witness::{base_light_witness, normal_light_witness};

/// Verifier over a shared [`ChainContext`].
pub struct Verifier<B: ProofBackend> {
    ctx: Arc<ChainContext<B>>,
}

impl<B: ProofBackend> Clone for Verifier<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<B: ProofBackend> Verifier<B> {
    /// Verifier over `ctx`.
    #[must_use]
    pub const fn new(ctx: Arc<ChainContext<B>>) -> Self {
        Self { ctx }
    }

    /// Check a base proof for `tx_id`.
    pub fn verify_base(&self, tx_id: &TxId, proof: &str) -> ChainResult<bool> {
        self.verify(CircuitKind::Base, tx_id, proof)
    }

    /// Check a normal proof for `tx_id`.
    pub fn verify_normal(&self, tx_id: &TxId, proof: &str) -> ChainResult<bool> {
        self.verify(CircuitKind::Normal, tx_id, proof)
    }

    /// Check `proof` as a proof of circuit `kind` for `tx_id`.
    pub fn verify(&self, kind: CircuitKind, tx_id: &TxId, proof: &str) -> ChainResult<bool> {
        let envelope = ProofEnvelope::<B::Proof>::decode(proof)?;
        if envelope.kind != kind {
            debug!(%tx_id, claimed = %kind, actual = %envelope.kind, "proof kind mismatch");
            return Ok(false);
        }
        let light = match kind {
            CircuitKind::Base => base_light_witness(tx_id)?,
            CircuitKind::Normal => normal_light_witness(tx_id)?,
        };
        let ok = self
            .ctx
            .backend()
            .verify(&self.ctx.artifact(kind).vk, &light, &envelope.proof)
            .map_err(|e| ChainError::backend(&e))?;
        debug!(%tx_id, %kind, verified = ok, "proof checked");
        Ok(ok)
    }

    /// Handle a verification request.
    pub fn handle(&self, req: &VerifyRequest) -> ChainResult<VerifyResult> {
        let id = req.tx_id()?;
        let verified = self.verify(req.kind, &id, &req.proof)?;
        Ok(VerifyResult {
            txnid: id.to_hex(),
            verified,
        })
    }
}
