//! Chain configuration: artifact directory and circuit bounds.
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! | variable | field |
//! |---|---|
//! | `TXIVC_ARTIFACT_DIR` | `artifact_dir` |
//! | `TXIVC_TX_BYTES` | `tx_bytes` |
//! | `TXIVC_PREFIX_BYTES` | `prefix_bytes` |
//! | `TXIVC_POSTFIX_BYTES` | `postfix_bytes` |
//!
//! Unparsable numeric overrides are ignored with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use txivc_core::{ChainError, ChainResult, CircuitParams};

/// Runtime configuration of a proof chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Directory holding `base_*.cbor` / `norm_*.cbor`.
    pub artifact_dir: PathBuf,
    /// Exact length of a base transaction.
    pub tx_bytes: usize,
    /// Exact length of a child transaction's prefix.
    pub prefix_bytes: usize,
    /// Exact length of a child transaction's postfix.
    pub postfix_bytes: usize,
}

impl Default for ChainConfig {
    /// Bounds of a one-input, two-output P2PKH transaction spent at input 0.
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            tx_bytes: 191,
            prefix_bytes: 5,
            postfix_bytes: 154,
        }
    }
}

impl ChainConfig {
    /// Parse TOML text; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> ChainResult<Self> {
        toml::from_str(text).map_err(|e| ChainError::Config(e.to_string()))
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> ChainResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ChainError::Config(format!("read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given (defaults otherwise), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> ChainResult<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let cfg = cfg.with_env_overrides(|k| std::env::var(k).ok());
        cfg.params().validate()?;
        Ok(cfg)
    }

    /// Apply overrides looked up through `var` (normally `std::env::var`).
    #[must_use]
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var("TXIVC_ARTIFACT_DIR") {
            if !dir.is_empty() {
                self.artifact_dir = PathBuf::from(dir);
            }
        }
        override_usize(&var, "TXIVC_TX_BYTES", &mut self.tx_bytes);
        override_usize(&var, "TXIVC_PREFIX_BYTES", &mut self.prefix_bytes);
        override_usize(&var, "TXIVC_POSTFIX_BYTES", &mut self.postfix_bytes);
        self
    }

    /// Circuit bounds.
    #[inline]
    #[must_use]
    pub const fn params(&self) -> CircuitParams {
        CircuitParams::new(self.tx_bytes, self.prefix_bytes, self.postfix_bytes)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> ChainResult<String> {
        toml::to_string_pretty(self).map_err(|e| ChainError::Config(e.to_string()))
    }
}

fn override_usize(var: &impl Fn(&str) -> Option<String>, name: &str, slot: &mut usize) {
    if let Some(raw) = var(name) {
        match raw.trim().parse::<usize>() {
            Ok(v) => *slot = v,
            Err(e) => warn!(name, value = %raw, error = %e, "ignoring unparsable override"),
        }
    }
}
