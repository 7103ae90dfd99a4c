//! Byte slicer: split a raw transaction around one input's previous-tx id.
//!
//! Wire layout walked here:
//!
//! ```text
//! version (4, LE) | input count (varint) | input_0 | input_1 | ... | rest
//! input = prev txid (32) | vout (4) | script len (varint) | script | sequence (4)
//! ```
//!
//! The linked identifier of input `i` starts right after inputs `0..i`, so
//! `offset = 4 + varint_len(count) + Σ len(input_j), j < i`. Only the lengths of
//! preceding inputs are needed; their content is never interpreted.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use txivc_core::{ChainError, ChainResult, SlicedTransaction, TxId, TX_ID_LEN};

/// Length of the version field.
pub const VERSION_LEN: usize = 4;

/// Reads the serialized length of one transaction input.
///
/// `input` starts at the first byte of the input and may run past its end.
pub trait InputReader {
    /// Number of bytes the input at the head of `input` occupies.
    fn input_len(&self, input: &[u8]) -> ChainResult<usize>;
}

/// Reader for the standard input layout (prev id, vout, script, sequence).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardInputReader;

impl InputReader for StandardInputReader {
    fn input_len(&self, input: &[u8]) -> ChainResult<usize> {
        // prev txid + vout
        let head = TX_ID_LEN + 4;
        let (script_len, varint_size) = read_varint(input.get(head..).unwrap_or_default())
            .map_err(|_| truncated("input script length"))?;
        let script_len = usize::try_from(script_len)
            .map_err(|_| ChainError::MalformedTransaction("script length overflows".into()))?;
        let total = head
            .checked_add(varint_size)
            .and_then(|n| n.checked_add(script_len))
            .and_then(|n| n.checked_add(4))
            .ok_or_else(|| ChainError::MalformedTransaction("input length overflows".into()))?;
        if input.len() < total {
            return Err(truncated("input"));
        }
        Ok(total)
    }
}

/// Decode a CompactSize varint at the head of `bytes`.
///
/// Returns `(value, encoded_len)`.
pub fn read_varint(bytes: &[u8]) -> ChainResult<(u64, usize)> {
    let first = *bytes.first().ok_or_else(|| truncated("varint"))?;
    let width = match first {
        0xfd => 2,
        0xfe => 4,
        0xff => 8,
        n => return Ok((u64::from(n), 1)),
    };
    let body = bytes.get(1..=width).ok_or_else(|| truncated("varint"))?;
    let mut le = [0u8; 8];
    le[..width].copy_from_slice(body);
    Ok((u64::from_le_bytes(le), 1 + width))
}

/// Canonical encoded length of `n` as a CompactSize varint.
#[inline]
#[must_use]
pub const fn varint_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Byte offset of input `input_index`'s previous-transaction id.
pub fn tx_id_offset<R: InputReader + ?Sized>(
    reader: &R,
    raw: &[u8],
    input_index: u64,
) -> ChainResult<usize> {
    if raw.len() < VERSION_LEN {
        return Err(truncated("version"));
    }
    let (count, count_len) = read_varint(&raw[VERSION_LEN..])?;
    if count < input_index.saturating_add(1) {
        return Err(ChainError::MalformedTransaction(format!(
            "input index {input_index} is outside of the range of [{count}] available inputs"
        )));
    }

    let mut offset = VERSION_LEN + count_len;
    for _ in 0..input_index {
        offset += reader.input_len(&raw[offset..])?;
    }
    Ok(offset)
}

/// Slice `raw` around the linked id of input `input_index`.
pub fn slice_tx(raw: &[u8], input_index: u64) -> ChainResult<SlicedTransaction> {
    slice_tx_with(&StandardInputReader, raw, input_index)
}

/// [`slice_tx`] with a caller-supplied input reader.
pub fn slice_tx_with<R: InputReader + ?Sized>(
    reader: &R,
    raw: &[u8],
    input_index: u64,
) -> ChainResult<SlicedTransaction> {
    let off = tx_id_offset(reader, raw, input_index)?;
    let end = off
        .checked_add(TX_ID_LEN)
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| truncated("linked tx id"))?;
    Ok(SlicedTransaction {
        prefix: raw[..off].to_vec(),
        linked_id: TxId::from_slice(&raw[off..end])?,
        postfix: raw[end..].to_vec(),
    })
}

fn truncated(what: &str) -> ChainError {
    ChainError::MalformedTransaction(format!("stream ends inside {what}"))
}
