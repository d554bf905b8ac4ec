//! # thdat RLE
//!
//! Run-length encoding for early dat archive entries.
//!
//! Two equal consecutive bytes act as the run marker: the byte that follows
//! them is a count of additional repetitions (0-255). After the count the
//! decoder forgets the previous byte, so the next byte never pairs with the
//! run that just ended. Bytes outside a run pass through unchanged.
//!
//! ```text
//! input:   41 41 41 41 41 42 43 43
//! encoded: 41 41 03 42 43 43 00
//! ```
//!
//! ## Example
//!
//! ```rust
//! use thdat_rle::{decode, encode};
//!
//! let input = b"aaaaaabcc";
//! let encoded = encode(input).unwrap();
//! assert_eq!(encoded, b"aa\x04bcc\x00");
//! assert_eq!(decode(&encoded).unwrap(), input);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use thdat_core::error::{Result, ThdatError, try_alloc};

/// Shortest run that is written with a count byte.
pub const MIN_RUN: usize = 2;

/// Longest run a single marker/count group can describe.
pub const MAX_RUN: usize = MIN_RUN + u8::MAX as usize;

/// Worst-case encoded size for `len` input bytes.
///
/// Only runs of exactly [`MIN_RUN`] bytes grow (two bytes become three), so
/// the output never exceeds one and a half times the input.
pub const fn max_encoded_len(len: usize) -> usize {
    len + len / 2
}

/// Run-length encode `data`.
///
/// Fails with [`ThdatError::Allocation`] if the output buffer cannot be
/// reserved.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = try_alloc(max_encoded_len(data.len()))?;
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let mut run_len = 1;

        while i + run_len < data.len() && data[i + run_len] == byte && run_len < MAX_RUN {
            run_len += 1;
        }

        if run_len >= MIN_RUN {
            result.extend_from_slice(&[byte, byte, (run_len - MIN_RUN) as u8]);
        } else {
            result.push(byte);
        }
        i += run_len;
    }

    log::trace!("rle: {} -> {} bytes", data.len(), result.len());
    Ok(result)
}

/// Decode run-length encoded `data`.
///
/// A run marker at the very end of the input with no count byte after it is
/// reported as [`ThdatError::CorruptedData`].
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() * 2);
    let mut prev: Option<u8> = None;
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        result.push(byte);
        i += 1;

        if prev == Some(byte) {
            let count = *data.get(i).ok_or_else(|| {
                ThdatError::corrupted(i as u64, "run marker without a count byte")
            })?;
            result.resize(result.len() + count as usize, byte);
            i += 1;
            prev = None;
        } else {
            prev = Some(byte);
        }
    }

    Ok(result)
}
