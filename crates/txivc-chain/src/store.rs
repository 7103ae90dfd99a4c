//! Artifact store: compiled circuits and key pairs, persisted once.
//!
//! Layout inside the artifact directory:
//!
//! ```text
//! base_ccs.cbor  base_vk.cbor  base_pk.cbor
//! norm_ccs.cbor  norm_vk.cbor  norm_pk.cbor
//! ```
//!
//! Each file is a sealed CBOR blob `{version, key, digest, payload}` where
//! `digest = blake3(payload)` and `key` is the [`ArtifactKey`] the circuit was
//! set up for. Blobs are written atomically in the order ccs, vk, pk; the
//! proving key is the presence sentinel. Once `{kind}_pk.cbor` exists the
//! store never runs setup for that kind again: a damaged sibling is reported as
//! [`ChainError::ArtifactCorrupt`], a key for other parameters as
//! [`ChainError::ArtifactMismatch`].
//!
//! Within one process each kind has a mutex guarding create-or-load plus the
//! cached `Arc<Artifact>`, so concurrent first requests run setup once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use txivc_core::io::{from_cbor, to_cbor, write_atomic};
use txivc_core::{
    Artifact, ArtifactKey, ChainError, ChainResult, CircuitDescription, CircuitKind,
    CircuitParams, ProofBackend,
};
use txivc_crypto::digest;

/// Format version of sealed artifact blobs.
pub const BLOB_VERSION: u16 = 1;

/// One persisted part of an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    /// Compiled constraint system.
    Ccs,
    /// Proving key (presence sentinel).
    Pk,
    /// Verifying key.
    Vk,
}

impl Part {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Ccs => "ccs",
            Self::Pk => "pk",
            Self::Vk => "vk",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SealedBlob {
    version: u16,
    key: ArtifactKey,
    digest: [u8; 32],
    payload: Vec<u8>,
}

/// Persistent, process-shared artifact store for one backend.
pub struct ArtifactStore<B: ProofBackend> {
    dir: PathBuf,
    backend: Arc<B>,
    base: Mutex<Option<Arc<Artifact<B>>>>,
    normal: Mutex<Option<Arc<Artifact<B>>>>,
}

impl<B: ProofBackend> std::fmt::Debug for ArtifactStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl<B: ProofBackend> ArtifactStore<B> {
    /// Store rooted at `dir` (created lazily on first persist).
    pub fn new(dir: impl Into<PathBuf>, backend: Arc<B>) -> Self {
        Self {
            dir: dir.into(),
            backend,
            base: Mutex::new(None),
            normal: Mutex::new(None),
        }
    }

    /// Artifact directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Backend the store compiles and sets up with.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Path of one persisted part, e.g. `<dir>/norm_vk.cbor`.
    #[must_use]
    pub fn path(&self, kind: CircuitKind, part: Part) -> PathBuf {
        self.dir
            .join(format!("{}_{}.cbor", kind.file_stem(), part.suffix()))
    }

    /// Whether a key pair for `kind` has been persisted.
    ///
    /// Only a clean `NotFound` on the proving key entry counts as absent. An
    /// entry that exists but cannot be inspected is [`ChainError::ArtifactCorrupt`],
    /// never a reason to run setup again.
    pub fn is_persisted(&self, kind: CircuitKind) -> ChainResult<bool> {
        let path = self.path(kind, Part::Pk);
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ChainError::corrupt(&path, format!("cannot stat: {e}"))),
        }
    }

    /// Load the base artifact for `params`, compiling and setting it up on first use.
    pub fn load_or_create_base(&self, params: &CircuitParams) -> ChainResult<Arc<Artifact<B>>> {
        let key = ArtifactKey::Base {
            tx_bytes: params.tx_bytes,
        };
        self.load_or_create(&self.base, key, || {
            self.backend.compile(&CircuitDescription::base(params))
        })
    }

    /// Load the normal artifact for `params` embedding `base`'s verifying key,
    /// compiling and setting it up on first use.
    pub fn load_or_create_normal(
        &self,
        params: &CircuitParams,
        base: &Artifact<B>,
    ) -> ChainResult<Arc<Artifact<B>>> {
        let key = ArtifactKey::Normal {
            prefix_bytes: params.prefix_bytes,
            postfix_bytes: params.postfix_bytes,
            base_vk_digest: vk_digest::<B>(&base.vk)?,
        };
        self.load_or_create(&self.normal, key, || {
            self.backend
                .compile(&CircuitDescription::normal(params, &base.vk))
        })
    }

    fn load_or_create(
        &self,
        slot: &Mutex<Option<Arc<Artifact<B>>>>,
        key: ArtifactKey,
        compile: impl FnOnce() -> anyhow::Result<B::ConstraintSystem>,
    ) -> ChainResult<Arc<Artifact<B>>> {
        let kind = key.kind();
        let mut cached = slot.lock();
        if let Some(artifact) = cached.as_ref() {
            if artifact.key != key {
                return Err(mismatch(kind, &artifact.key, &key));
            }
            return Ok(Arc::clone(artifact));
        }

        let artifact = if self.is_persisted(kind)? {
            self.load(key)?
        } else {
            self.create(key, compile)?
        };
        let artifact = Arc::new(artifact);
        *cached = Some(Arc::clone(&artifact));
        Ok(artifact)
    }

    fn load(&self, key: ArtifactKey) -> ChainResult<Artifact<B>> {
        let kind = key.kind();
        let t0 = Instant::now();
        // pk first: it decides whether the persisted key pair matches at all.
        let pk = self.read_part(kind, Part::Pk, &key)?;
        let ccs = self.read_part(kind, Part::Ccs, &key)?;
        let vk = self.read_part(kind, Part::Vk, &key)?;
        info!(
            %kind,
            %key,
            dir = %self.dir.display(),
            elapsed_ms = t0.elapsed().as_millis(),
            "loaded artifact"
        );
        Ok(Artifact { key, ccs, pk, vk })
    }

    fn create(
        &self,
        key: ArtifactKey,
        compile: impl FnOnce() -> anyhow::Result<B::ConstraintSystem>,
    ) -> ChainResult<Artifact<B>> {
        let kind = key.kind();
        info!(%kind, %key, dir = %self.dir.display(), "no persisted key pair, running setup");

        let t0 = Instant::now();
        let ccs = compile().map_err(|e| ChainError::backend(&e))?;
        let t_compile = t0.elapsed();
        let (pk, vk) = self
            .backend
            .setup(&ccs)
            .map_err(|e| ChainError::backend(&e))?;
        let t_setup = t0.elapsed().saturating_sub(t_compile);

        self.write_part(kind, Part::Ccs, &key, &ccs)?;
        self.write_part(kind, Part::Vk, &key, &vk)?;
        self.write_part(kind, Part::Pk, &key, &pk)?;

        info!(
            %kind,
            compile_ms = t_compile.as_millis(),
            setup_ms = t_setup.as_millis(),
            total_ms = t0.elapsed().as_millis(),
            "artifact set up and persisted"
        );
        Ok(Artifact { key, ccs, pk, vk })
    }

    fn write_part<T: Serialize>(
        &self,
        kind: CircuitKind,
        part: Part,
        key: &ArtifactKey,
        value: &T,
    ) -> ChainResult<()> {
        let path = self.path(kind, part);
        let payload = to_cbor(value).map_err(|e| ChainError::backend(&e))?;
        let blob = SealedBlob {
            version: BLOB_VERSION,
            key: *key,
            digest: digest(&payload),
            payload,
        };
        let bytes = to_cbor(&blob).map_err(|e| ChainError::backend(&e))?;
        write_atomic(&path, &bytes)
            .map_err(|e| ChainError::Io(io::Error::other(format!("{e:#}"))))?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact blob");
        Ok(())
    }

    fn read_part<T: DeserializeOwned>(
        &self,
        kind: CircuitKind,
        part: Part,
        key: &ArtifactKey,
    ) -> ChainResult<T> {
        let path = self.path(kind, part);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Also reached for a pk entry that is a dangling link.
                return Err(ChainError::corrupt(
                    &path,
                    "missing or dangling while the proving key entry is present",
                ));
            }
            Err(e) => return Err(ChainError::corrupt(&path, format!("unreadable: {e}"))),
        };
        let blob: SealedBlob = from_cbor(&bytes)
            .map_err(|e| ChainError::corrupt(&path, format!("not a sealed blob: {e:#}")))?;
        if blob.version != BLOB_VERSION {
            return Err(ChainError::corrupt(
                &path,
                format!("unsupported blob version {}", blob.version),
            ));
        }
        if digest(&blob.payload) != blob.digest {
            return Err(ChainError::corrupt(&path, "payload digest mismatch"));
        }
        if blob.key != *key {
            return Err(mismatch(kind, &blob.key, key));
        }
        from_cbor(&blob.payload)
            .map_err(|e| ChainError::corrupt(&path, format!("payload does not decode: {e:#}")))
    }
}

/// Fingerprint of a verifying key: blake3 over its CBOR encoding.
pub fn vk_digest<B: ProofBackend>(vk: &B::VerifyingKey) -> ChainResult<[u8; 32]> {
    let bytes = to_cbor(vk).map_err(|e| ChainError::backend(&e))?;
    Ok(digest(&bytes))
}

fn mismatch(kind: CircuitKind, persisted: &ArtifactKey, requested: &ArtifactKey) -> ChainError {
    ChainError::ArtifactMismatch {
        kind,
        persisted: persisted.to_string(),
        requested: requested.to_string(),
    }
}
