//! Serialization helpers and atomic file writes.
//!
//! - [`write_atomic`]: write-to-temp, fsync, rename. Readers either see the
//!   previous file or the complete new one, never a prefix.
//! - [`write_json`]: pretty JSON through [`write_atomic`].
//! - In-memory CBOR helpers: [`to_cbor`] / [`from_cbor`] (artifact blobs).

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(dir)))?;
        }
    }
    Ok(())
}

/// Write `bytes` to `path` so that the file appears complete or not at all.
///
/// The temp file is `<name>.tmp` next to the target, so the rename never
/// crosses a filesystem.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let tmp = tmp_path(path);
    {
        let f = File::create(&tmp).with_context(|| format!("create {}", display(&tmp)))?;
        let mut w = BufWriter::new(f);
        w.write_all(bytes)
            .with_context(|| format!("write {}", display(&tmp)))?;
        let f = w
            .into_inner()
            .map_err(|e| anyhow!("flush {}: {}", display(&tmp), e.error()))?;
        f.sync_all()
            .with_context(|| format!("sync {}", display(&tmp)))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", display(&tmp), display(path)))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a value as pretty **JSON**, atomically.
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(v).context("serialize JSON")?;
    write_atomic(path, &bytes)
}

/// Serialize any `T: Serialize` to **CBOR bytes** using `ciborium`.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).context("serialize CBOR")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from **CBOR bytes** using `ciborium`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).context("deserialize CBOR")?;
    Ok(v)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArtifactKey, CircuitKind};

    fn tmp_file(name: &str, ext: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("txivc_core_io_{name}_{nanos}.{ext}"));
        p
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let path = tmp_file("atomic", "bin");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!tmp_path(&path).exists());
        write_atomic(&path, b"world!").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"world!");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = tmp_file("nested", "d");
        let path = dir.join("a").join("b.json");
        write_json(&path, &CircuitKind::Normal).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"normal\"");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cbor_helpers_carry_artifact_keys() {
        let key = ArtifactKey::Normal {
            prefix_bytes: 5,
            postfix_bytes: 154,
            base_vk_digest: [7u8; 32],
        };
        let back: ArtifactKey = from_cbor(&to_cbor(&key).unwrap()).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn truncated_cbor_is_an_error() {
        let bytes = to_cbor(&vec![1u32; 64]).unwrap();
        assert!(from_cbor::<Vec<u32>>(&bytes[..bytes.len() / 2]).is_err());
    }
}
