//! Artifact store: setup-once, corruption and parameter-mismatch behaviour.

#![allow(clippy::unwrap_used)]

mod common;

use std::fs;
use std::sync::Arc;
use std::thread;

use common::{params, store};
use txivc_chain::{vk_digest, ArtifactStore, ChainContext, Part};
use txivc_core::{ArtifactKey, ChainError, CircuitKind, CircuitParams};

#[test]
fn setup_runs_once_per_directory() {
    let dir = tempfile::tempdir().unwrap();

    let (backend, st) = store(dir.path());
    let first = ChainContext::bootstrap(&st, params()).unwrap();
    assert_eq!(backend.setups(), 2, "base + normal on first use");
    for kind in [CircuitKind::Base, CircuitKind::Normal] {
        assert!(st.is_persisted(kind).unwrap());
        for part in [Part::Ccs, Part::Pk, Part::Vk] {
            assert!(st.path(kind, part).exists());
        }
    }

    // Same store: served from the in-process cache.
    let again = ChainContext::bootstrap(&st, params()).unwrap();
    assert_eq!(backend.setups(), 2);
    assert_eq!(again.base().vk, first.base().vk);

    // Fresh store over the same directory: loaded from disk, never set up.
    let (backend2, st2) = store(dir.path());
    let reopened = ChainContext::bootstrap(&st2, params()).unwrap();
    assert_eq!(backend2.setups(), 0);
    assert_eq!(reopened.base().vk, first.base().vk);
    assert_eq!(reopened.normal().vk, first.normal().vk);
    assert_eq!(reopened.normal().pk, first.normal().pk);
}

#[test]
fn concurrent_first_requests_share_one_setup() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, st) = store(dir.path());
    let st = Arc::new(st);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let st = Arc::clone(&st);
            thread::spawn(move || st.load_or_create_base(&params()).unwrap())
        })
        .collect();
    let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(backend.setups(), 1);
    assert!(artifacts.iter().all(|a| a.vk == artifacts[0].vk));
}

#[test]
fn normal_key_pins_the_embedded_base_vk() {
    let dir = tempfile::tempdir().unwrap();
    let (_, st) = store(dir.path());
    let ctx = ChainContext::bootstrap(&st, params()).unwrap();
    let expected = ArtifactKey::Normal {
        prefix_bytes: 5,
        postfix_bytes: 154,
        base_vk_digest: vk_digest::<common::CountingBackend>(&ctx.base().vk).unwrap(),
    };
    assert_eq!(ctx.normal().key, expected);
}

#[test]
fn garbage_blob_is_corrupt_and_not_regenerated() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, st) = store(dir.path());
        st.load_or_create_base(&params()).unwrap();
    }
    let (backend, st) = store(dir.path());
    fs::write(st.path(CircuitKind::Base, Part::Vk), b"not cbor at all").unwrap();

    let err = st.load_or_create_base(&params()).unwrap_err();
    assert!(matches!(err, ChainError::ArtifactCorrupt { .. }), "{err}");
    assert_eq!(backend.setups(), 0);
    assert_eq!(
        fs::read(st.path(CircuitKind::Base, Part::Vk)).unwrap(),
        b"not cbor at all"
    );
}

#[test]
fn flipped_byte_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, st) = store(dir.path());
        st.load_or_create_base(&params()).unwrap();
    }
    let (_, st) = store(dir.path());
    let path = st.path(CircuitKind::Base, Part::Ccs);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, bytes).unwrap();

    let err = st.load_or_create_base(&params()).unwrap_err();
    assert!(matches!(err, ChainError::ArtifactCorrupt { .. }), "{err}");
}

#[test]
fn missing_sibling_next_to_a_proving_key_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, st) = store(dir.path());
        st.load_or_create_base(&params()).unwrap();
    }
    let (backend, st) = store(dir.path());
    fs::remove_file(st.path(CircuitKind::Base, Part::Ccs)).unwrap();

    match st.load_or_create_base(&params()).unwrap_err() {
        ChainError::ArtifactCorrupt { path, .. } => {
            assert_eq!(path, st.path(CircuitKind::Base, Part::Ccs));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.setups(), 0);
}

#[test]
fn other_parameters_are_a_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, st) = store(dir.path());
        st.load_or_create_base(&params()).unwrap();
    }
    let (backend, st) = store(dir.path());
    let err = st
        .load_or_create_base(&CircuitParams::new(190, 5, 154))
        .unwrap_err();
    assert!(
        matches!(
            err,
            ChainError::ArtifactMismatch {
                kind: CircuitKind::Base,
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(backend.setups(), 0);

    // Cached artifact in a live store is checked too.
    let (_, live) = store(dir.path());
    live.load_or_create_base(&params()).unwrap();
    assert!(matches!(
        live.load_or_create_base(&CircuitParams::new(190, 5, 154)),
        Err(ChainError::ArtifactMismatch { .. })
    ));
}

#[test]
fn regenerated_base_invalidates_the_persisted_normal_circuit() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, st) = store(dir.path());
        ChainContext::bootstrap(&st, params()).unwrap();
    }
    // Operator wipes only the base key pair.
    let (_, st) = store(dir.path());
    for part in [Part::Ccs, Part::Pk, Part::Vk] {
        fs::remove_file(st.path(CircuitKind::Base, part)).unwrap();
    }

    let err = ChainContext::bootstrap(&st, params()).unwrap_err();
    assert!(
        matches!(
            err,
            ChainError::ArtifactMismatch {
                kind: CircuitKind::Normal,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn invalid_params_fail_before_touching_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, st): (_, ArtifactStore<_>) = store(dir.path());
    let err = ChainContext::bootstrap(&st, CircuitParams::new(191, 4, 154)).unwrap_err();
    assert!(matches!(err, ChainError::Config(_)));
    assert_eq!(backend.setups(), 0);
    assert!(!st.is_persisted(CircuitKind::Base).unwrap());
}

#[cfg(unix)]
#[test]
fn dangling_proving_key_link_is_corrupt_not_absent() {
    let dir = tempfile::tempdir().unwrap();
    let (_, st) = store(dir.path());
    st.load_or_create_base(&params()).unwrap();
    let vk_before = fs::read(st.path(CircuitKind::Base, Part::Vk)).unwrap();

    let pk = st.path(CircuitKind::Base, Part::Pk);
    fs::remove_file(&pk).unwrap();
    std::os::unix::fs::symlink(dir.path().join("unmounted").join("base_pk.cbor"), &pk).unwrap();

    let (backend, st) = store(dir.path());
    assert!(st.is_persisted(CircuitKind::Base).unwrap());
    let err = st.load_or_create_base(&params()).unwrap_err();
    assert!(matches!(err, ChainError::ArtifactCorrupt { .. }), "{err}");
    assert_eq!(backend.setups(), 0);
    assert_eq!(fs::read(st.path(CircuitKind::Base, Part::Vk)).unwrap(), vk_before);
}
