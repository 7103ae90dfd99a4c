//! Canonical core types used across the TXIVC workspace.
//!
//! These live in `txivc-core` and are re-exported at the crate root so other
//! crates can import via `txivc_core::TxId`, `txivc_core::CircuitParams`, etc.
//!
//! Serialized forms stay conservative and portable (serde; hex at text edges).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChainError, ChainResult};

/// Length in bytes of a transaction identifier.
pub const TX_ID_LEN: usize = 32;

/// Transaction identifier: double SHA-256 of the raw transaction bytes.
///
/// Bytes are kept in digest order; the hex form is not reversed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TxId(pub [u8; TX_ID_LEN]);

impl TxId {
    /// Wrap raw digest bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; TX_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy an identifier out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> ChainResult<Self> {
        let arr: [u8; TX_ID_LEN] = bytes.try_into().map_err(|_| {
            ChainError::MalformedTransaction(format!(
                "tx id must be {TX_ID_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> ChainResult<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| ChainError::MalformedTransaction(format!("tx id is not hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Borrow the digest bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TX_ID_LEN] {
        &self.0
    }

    /// Lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.to_hex())
    }
}

impl FromStr for TxId {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// The three regions of a raw transaction fed to the inductive circuit.
///
/// `prefix ++ linked_id ++ postfix` reproduces the raw transaction exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlicedTransaction {
    /// Bytes before the linked identifier (version, input count, earlier inputs).
    pub prefix: Vec<u8>,
    /// Identifier of the spent predecessor transaction.
    pub linked_id: TxId,
    /// Bytes after the linked identifier.
    pub postfix: Vec<u8>,
}

impl SlicedTransaction {
    /// Total length of the reassembled transaction.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefix.len() + TX_ID_LEN + self.postfix.len()
    }

    /// Always `false`: a slice carries at least the 32-byte identifier.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Reassemble the original bytes.
    #[must_use]
    pub fn reassemble(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(self.linked_id.as_bytes());
        out.extend_from_slice(&self.postfix);
        out
    }
}

/// Which of the two circuits an artifact or proof belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    /// First link of a chain; proven without a predecessor.
    Base,
    /// Subsequent link; recursively verifies a base proof.
    Normal,
}

impl CircuitKind {
    /// File-name stem for persisted blobs (`base_pk.cbor`, `norm_pk.cbor`, …).
    #[inline]
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Normal => "norm",
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Normal => "normal",
        })
    }
}

impl FromStr for CircuitKind {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "normal" | "norm" => Ok(Self::Normal),
            other => Err(ChainError::Config(format!(
                "unknown proof kind {other:?} (expected base|normal)"
            ))),
        }
    }
}

/// Structural bounds that fix the shape of both circuits.
///
/// The base circuit hashes exactly `tx_bytes` bytes. The normal circuit hashes
/// `prefix_bytes + 32 + postfix_bytes` bytes of the child transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitParams {
    /// Exact length of a base (genesis) transaction.
    pub tx_bytes: usize,
    /// Exact length of a child transaction's prefix region.
    pub prefix_bytes: usize,
    /// Exact length of a child transaction's postfix region.
    pub postfix_bytes: usize,
}

impl CircuitParams {
    /// Construct parameters.
    #[inline]
    #[must_use]
    pub const fn new(tx_bytes: usize, prefix_bytes: usize, postfix_bytes: usize) -> Self {
        Self {
            tx_bytes,
            prefix_bytes,
            postfix_bytes,
        }
    }

    /// Length of a child transaction accepted by the normal circuit.
    #[inline]
    #[must_use]
    pub const fn child_tx_bytes(&self) -> usize {
        self.prefix_bytes + TX_ID_LEN + self.postfix_bytes
    }

    /// Reject parameters no circuit can be built for.
    pub fn validate(&self) -> ChainResult<()> {
        if self.tx_bytes == 0 {
            return Err(ChainError::Config("tx_bytes must be > 0".into()));
        }
        // version (4) + at least a one-byte input count
        if self.prefix_bytes < 5 {
            return Err(ChainError::Config(format!(
                "prefix_bytes must be >= 5 (version + input count), got {}",
                self.prefix_bytes
            )));
        }
        Ok(())
    }
}

/// Identity of a persisted artifact: the parameters its circuit was shaped by.
///
/// The normal circuit embeds the base verifying key, so its key also pins the
/// digest of that verifying key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKey {
    /// Base circuit over `tx_bytes` bytes.
    Base {
        /// Exact base transaction length.
        tx_bytes: usize,
    },
    /// Normal circuit over the given prefix/postfix lengths.
    Normal {
        /// Exact prefix length.
        prefix_bytes: usize,
        /// Exact postfix length.
        postfix_bytes: usize,
        /// Digest of the base verifying key the circuit recursively checks.
        base_vk_digest: [u8; 32],
    },
}

impl ArtifactKey {
    /// Circuit kind this key belongs to.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> CircuitKind {
        match self {
            Self::Base { .. } => CircuitKind::Base,
            Self::Normal { .. } => CircuitKind::Normal,
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base { tx_bytes } => write!(f, "base(tx_bytes={tx_bytes})"),
            Self::Normal {
                prefix_bytes,
                postfix_bytes,
                base_vk_digest,
            } => write!(
                f,
                "normal(prefix_bytes={prefix_bytes}, postfix_bytes={postfix_bytes}, base_vk={})",
                hex::encode(&base_vk_digest[..8])
            ),
        }
    }
}
