//! txivc-chain — proof-chain orchestration over a [`txivc_core::ProofBackend`].
//!
//! - [`tx`]: slice a raw transaction into prefix, linked id and postfix.
//! - [`witness`]: base and inductive assignments; the single inner→outer
//!   conversion point.
//! - [`store`]: compile/setup once, persist sealed blobs, load forever after.
//! - [`chain`]: the base/inductive prover and its immutable context.
//! - [`verifier`]: light-witness reconstruction and verify dispatch.
//! - [`config`]: TOML + environment configuration.
//!
//! ```no_run
//! use std::sync::Arc;
//! # use txivc_core::{ChainResult, ProofBackend};
//! # fn demo<B: ProofBackend>(backend: Arc<B>, raw: &[u8]) -> ChainResult<()> {
//! use txivc_chain::{ChainConfig, ChainContext, Link, ProofChain, Verifier};
//!
//! let ctx = Arc::new(ChainContext::from_config(backend, &ChainConfig::load(None)?)?);
//! let p0 = ProofChain::new(Arc::clone(&ctx)).prove(Link::Base { raw })?;
//! assert!(Verifier::new(ctx).verify_base(&p0.tx_id, &p0.proof)?);
//! # Ok(()) }
//! ```

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
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod chain;
pub mod config;
pub mod store;
pub mod tx;
pub mod verifier;
pub mod witness;

pub use chain::{ChainContext, Link, ProofChain, ProvedLink};
pub use config::ChainConfig;
pub use store::{vk_digest, ArtifactStore, Part};
pub use tx::{slice_tx, slice_tx_with, InputReader, StandardInputReader};
pub use verifier::Verifier;
pub use witness::PredecessorLink;
