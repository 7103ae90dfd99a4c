//! txivc-core — canonical types, error taxonomy, witnesses, and the proof-backend boundary.
//!
//! This crate defines the **stable boundary** used across TXIVC crates:
//! - canonical data types (`TxId`, `SlicedTransaction`, `CircuitParams`, …),
//! - the error taxonomy every layer reports through ([`ChainError`]),
//! - the two scalar fields of the recursion cycle and the witness model,
//! - the **backend-agnostic** [`ProofBackend`] trait, and
//! - JSON/CBOR I/O helpers plus the request/response wire types.
//!
//! ```no_run
//! use txivc_core::{CircuitParams, TxId};
//! let params = CircuitParams::new(191, 5, 154);
//! let id = TxId::from_hex("faf3013aab53ae122e6cfdef7720c7a785fed4ce7f8f3dd19379f31e62651c71")?;
//! # let _ = (params, id);
//! # Ok::<(), txivc_core::ChainError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Request/response types for the proving and verification surface.
pub mod api;
/// Proof envelope and circuit artifact types.
pub mod artifact;
/// Proof backend trait and circuit descriptions.
pub mod backend;
/// Error taxonomy shared by every layer.
pub mod error;
/// The two scalar fields of the recursion cycle.
pub mod field;
/// JSON/CBOR helpers and atomic file writes.
pub mod io;
/// Canonical core data types shared across the workspace.
pub mod types;
/// Full and light witnesses.
pub mod witness;

// ---- Re-exports for workspace compatibility ----
pub use artifact::*;
pub use backend::*;
pub use error::*;
pub use field::*;
pub use types::*;
pub use witness::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use txivc_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        artifact::{Artifact, ProofEnvelope},
        backend::{CircuitDescription, ProofBackend},
        error::{ChainError, ChainResult},
        field::ScalarField,
        types::*,
        witness::{FullWitness, LightWitness},
    };
}
