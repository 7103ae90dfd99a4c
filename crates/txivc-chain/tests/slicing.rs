//! Byte-slicer properties over generated and real transactions.

#![allow(clippy::unwrap_used)]

mod common;

use proptest::prelude::*;
use txivc_chain::tx::{read_varint, tx_id_offset, varint_len};
use txivc_chain::{slice_tx, slice_tx_with, InputReader, StandardInputReader};
use txivc_core::{ChainError, ChainResult, TxId};

fn push_varint(out: &mut Vec<u8>, n: u64) {
    match varint_len(n) {
        1 => out.push(u8::try_from(n).unwrap()),
        3 => {
            out.push(0xfd);
            out.extend_from_slice(&u16::try_from(n).unwrap().to_le_bytes());
        }
        5 => {
            out.push(0xfe);
            out.extend_from_slice(&u32::try_from(n).unwrap().to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

#[derive(Debug, Clone)]
struct GenInput {
    prev: [u8; 32],
    vout: u32,
    script: Vec<u8>,
    sequence: u32,
}

impl GenInput {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.prev);
        out.extend_from_slice(&self.vout.to_le_bytes());
        push_varint(out, self.script.len() as u64);
        out.extend_from_slice(&self.script);
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }
}

fn arb_input() -> impl Strategy<Value = GenInput> {
    (
        any::<[u8; 32]>(),
        any::<u32>(),
        // Crosses the one-byte/three-byte varint boundary at 0xfd.
        prop::collection::vec(any::<u8>(), 0..300),
        any::<u32>(),
    )
        .prop_map(|(prev, vout, script, sequence)| GenInput {
            prev,
            vout,
            script,
            sequence,
        })
}

fn arb_tx() -> impl Strategy<Value = (Vec<u8>, Vec<GenInput>, usize)> {
    (
        prop::collection::vec(arb_input(), 1..5),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<[u8; 4]>(),
    )
        .prop_flat_map(|(inputs, tail, version)| {
            let n = inputs.len();
            (Just(inputs), Just(tail), Just(version), 0..n)
        })
        .prop_map(|(inputs, tail, version, index)| {
            let mut raw = version.to_vec();
            push_varint(&mut raw, inputs.len() as u64);
            for i in &inputs {
                i.encode(&mut raw);
            }
            raw.extend_from_slice(&tail);
            (raw, inputs, index)
        })
}

proptest! {
    #[test]
    fn slices_reassemble_to_the_raw_bytes((raw, inputs, index) in arb_tx()) {
        let s = slice_tx(&raw, index as u64).unwrap();

        prop_assert_eq!(s.reassemble(), raw.clone());
        prop_assert_eq!(s.prefix.len() + 32 + s.postfix.len(), raw.len());
        prop_assert_eq!(s.linked_id, TxId(inputs[index].prev));

        let mut expected_off = 4 + varint_len(inputs.len() as u64);
        for i in &inputs[..index] {
            let mut enc = Vec::new();
            i.encode(&mut enc);
            expected_off += enc.len();
        }
        prop_assert_eq!(s.prefix.len(), expected_off);
    }

    #[test]
    fn index_past_the_input_count_is_malformed((raw, inputs, _) in arb_tx()) {
        let err = slice_tx(&raw, inputs.len() as u64).unwrap_err();
        prop_assert!(matches!(err, ChainError::MalformedTransaction(_)));
    }

    #[test]
    fn truncation_never_panics((raw, _, index) in arb_tx(), cut in 0usize..400) {
        let cut = cut.min(raw.len());
        // Either a clean slice of the shorter stream or a malformed-tx error.
        match slice_tx(&raw[..cut], index as u64) {
            Ok(s) => prop_assert_eq!(s.reassemble(), raw[..cut].to_vec()),
            Err(e) => prop_assert!(matches!(e, ChainError::MalformedTransaction(_))),
        }
    }
}

#[test]
fn second_input_offset_is_version_count_and_one_41_byte_input() {
    let first = GenInput {
        prev: [0x11; 32],
        vout: 0,
        script: Vec::new(),
        sequence: u32::MAX,
    };
    let second = GenInput {
        prev: [0x22; 32],
        vout: 1,
        script: vec![0x51],
        sequence: u32::MAX,
    };
    let mut raw = vec![0x02, 0, 0, 0, 0x02];
    first.encode(&mut raw);
    second.encode(&mut raw);
    raw.extend_from_slice(&[0, 0, 0, 0, 0]);

    assert_eq!(tx_id_offset(&StandardInputReader, &raw, 1).unwrap(), 4 + 1 + 41);
    let s = slice_tx(&raw, 1).unwrap();
    assert_eq!(s.linked_id, TxId([0x22; 32]));
}

#[test]
fn sample_transaction_input_zero() {
    let raw = common::sample_tx();
    let s = slice_tx(&raw, 0).unwrap();
    assert_eq!(hex::encode(&s.prefix), "0200000001");
    assert_eq!(
        s.linked_id.to_hex(),
        "90bc0a14e94cdd565265d79c4f9bed0f6404241f3fb69d6458b30b41611317f7"
    );
    assert_eq!(s.postfix.len(), 154);
    assert!(slice_tx(&raw, 1).is_err());
}

#[test]
fn varint_reader_matches_writer() {
    for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
        let mut enc = Vec::new();
        push_varint(&mut enc, n);
        assert_eq!(read_varint(&enc).unwrap(), (n, varint_len(n)));
    }
}

/// Reader for a toy layout where every input is a length byte plus that many bytes.
struct LengthPrefixed;

impl InputReader for LengthPrefixed {
    fn input_len(&self, input: &[u8]) -> ChainResult<usize> {
        let n = usize::from(
            *input
                .first()
                .ok_or_else(|| ChainError::MalformedTransaction("empty".into()))?,
        );
        if input.len() < 1 + n {
            return Err(ChainError::MalformedTransaction("short input".into()));
        }
        Ok(1 + n)
    }
}

#[test]
fn custom_input_reader_drives_the_offset() {
    let mut raw = vec![1, 0, 0, 0, 2];
    raw.extend_from_slice(&[3, 0xaa, 0xbb, 0xcc]);
    raw.extend_from_slice(&[0x77; 32]);
    raw.push(0xee);

    let s = slice_tx_with(&LengthPrefixed, &raw, 1).unwrap();
    assert_eq!(s.prefix.len(), 4 + 1 + 4);
    assert_eq!(s.linked_id, TxId([0x77; 32]));
    assert_eq!(s.postfix, vec![0xee]);
}
