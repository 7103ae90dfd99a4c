//! The two scalar fields of the recursion cycle.
//!
//! - `Inner`: the base circuit's field, `p = 2^61 - 1`.
//! - `Outer`: the normal circuit's field, Goldilocks `p = 2^64 - 2^32 + 1`.
//!
//! The outer modulus is larger than the inner one, so every canonical inner
//! residue is also a canonical outer residue. Lifting is therefore exact: the
//! integer value is carried over unchanged and nothing is reduced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inner (base circuit) modulus, `2^61 - 1`.
pub const INNER_MODULUS: u64 = (1u64 << 61) - 1;

/// Outer (normal circuit) modulus, `2^64 - 2^32 + 1`.
pub const OUTER_MODULUS: u64 = 0xFFFF_FFFF_0000_0001;

// Exact lifting depends on this ordering.
const _: () = assert!(INNER_MODULUS < OUTER_MODULUS);

/// 64-bit prime field element (const generic modulus).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Fp64<const P: u64>(
    /// Canonical representative modulo `P`.
    u64,
);

impl<const P: u64> Fp64<P> {
    /// Zero.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// From `u64` reduced mod `P`.
    #[inline]
    #[must_use]
    pub const fn from_u64(x: u64) -> Self {
        Self(x % P)
    }

    /// Accept `x` only if it is already a canonical residue.
    #[inline]
    #[must_use]
    pub const fn from_canonical(x: u64) -> Option<Self> {
        if x < P {
            Some(Self(x))
        } else {
            None
        }
    }

    /// Canonical representative.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Into little-endian 8 bytes (canonical for this field).
    #[inline]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

/// Element of the base circuit's field.
pub type InnerScalar = Fp64<INNER_MODULUS>;
/// Element of the normal circuit's field.
pub type OuterScalar = Fp64<OUTER_MODULUS>;

/// Exact embedding of an inner residue into the outer field.
#[inline]
#[must_use]
pub const fn lift_to_outer(x: InnerScalar) -> OuterScalar {
    Fp64(x.value())
}

/// Field tag carried by witnesses and keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarField {
    /// Field of the base circuit.
    Inner,
    /// Field of the normal circuit; natively verifies inner-field proofs.
    Outer,
}

impl ScalarField {
    /// Prime modulus of this field.
    #[inline]
    #[must_use]
    pub const fn modulus(self) -> u64 {
        match self {
            Self::Inner => INNER_MODULUS,
            Self::Outer => OUTER_MODULUS,
        }
    }

    /// Whether `x` is a canonical residue.
    #[inline]
    #[must_use]
    pub const fn is_canonical(self, x: u64) -> bool {
        x < self.modulus()
    }

    /// Stable one-byte tag used when binding values into transcripts.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Inner => 1,
            Self::Outer => 2,
        }
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "inner",
            Self::Outer => "outer",
        })
    }
}

/// One field element per byte, the way byte arrays are assigned to circuits.
#[must_use]
pub fn bytes_to_elements(bytes: &[u8]) -> Vec<u64> {
    bytes.iter().map(|&b| u64::from(b)).collect()
}
