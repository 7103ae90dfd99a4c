//! Full and light witnesses.
//!
//! A witness is a flat vector of canonical field residues split into a public
//! and a secret part, tagged with the field it lives in. The full witness is
//! only ever handed to `prove`; the light witness (public part only) is only
//! ever handed to `verify`.

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, ChainResult};
use crate::field::ScalarField;

/// Public values of an assignment; used for verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightWitness {
    field: ScalarField,
    public: Vec<u64>,
}

impl LightWitness {
    /// Build a light witness, rejecting non-canonical residues.
    pub fn new(field: ScalarField, public: Vec<u64>) -> ChainResult<Self> {
        check_canonical(field, "public", &public)?;
        Ok(Self { field, public })
    }

    /// Field the values live in.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> ScalarField {
        self.field
    }

    /// Public values.
    #[inline]
    #[must_use]
    pub fn public(&self) -> &[u64] {
        &self.public
    }

    /// Number of public values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.public.len()
    }

    /// Whether there are no public values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.public.is_empty()
    }
}

/// Complete assignment (public + secret) for proving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullWitness {
    field: ScalarField,
    public: Vec<u64>,
    secret: Vec<u64>,
}

impl FullWitness {
    /// Build a full witness, rejecting non-canonical residues.
    pub fn new(field: ScalarField, public: Vec<u64>, secret: Vec<u64>) -> ChainResult<Self> {
        check_canonical(field, "public", &public)?;
        check_canonical(field, "secret", &secret)?;
        Ok(Self {
            field,
            public,
            secret,
        })
    }

    /// Field the values live in.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> ScalarField {
        self.field
    }

    /// Public values.
    #[inline]
    #[must_use]
    pub fn public(&self) -> &[u64] {
        &self.public
    }

    /// Secret values.
    #[inline]
    #[must_use]
    pub fn secret(&self) -> &[u64] {
        &self.secret
    }

    /// Projection onto the public values.
    #[must_use]
    pub fn public_part(&self) -> LightWitness {
        LightWitness {
            field: self.field,
            public: self.public.clone(),
        }
    }
}

fn check_canonical(field: ScalarField, part: &'static str, values: &[u64]) -> ChainResult<()> {
    match values.iter().position(|v| !field.is_canonical(*v)) {
        Some(index) => Err(ChainError::NonCanonicalValue {
            field,
            part,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
