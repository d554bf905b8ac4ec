//! Read and compress steps.
//!
//! Each step hands back a freshly allocated buffer that the caller owns
//! outright. Steps that take a buffer take it by value, so a buffer passed in
//! is gone once the call returns, whether it succeeded or not.

use std::io::Read;
use thdat_core::error::{Result, ThdatError, try_alloc};
use thdat_core::{Entry, EntryMethod};

fn raw_len(entry: &Entry) -> Result<usize> {
    usize::try_from(entry.size).map_err(|_| {
        ThdatError::invalid_argument(format!(
            "entry {:?} is too large to buffer ({} bytes)",
            entry.name, entry.size
        ))
    })
}

/// Read exactly `entry.size` bytes from `reader`.
///
/// A short read is reported as [`ThdatError::Io`] and the partial buffer is
/// released before returning. The entry is not modified.
pub fn read_file<R: Read + ?Sized>(entry: &Entry, reader: &mut R) -> Result<Vec<u8>> {
    let size = raw_len(entry)?;
    let mut data = try_alloc(size)?;
    data.resize(size, 0);
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Read exactly `entry.size` bytes from `reader` and return them LZSS
/// compressed.
///
/// The entry is not modified; the compressed size is the length of the
/// returned buffer.
pub fn read_file_lzss<R: Read + ?Sized>(entry: &Entry, reader: &mut R) -> Result<Vec<u8>> {
    let raw = read_file(entry, reader)?;
    thdat_lzss::encode(&raw)
}

/// Run-length encode `data`, consuming it.
///
/// Sets `entry.compressed_size` to the output length and marks the entry as
/// RLE. On failure `data` is still consumed and the entry is unchanged.
pub fn rle(entry: &mut Entry, data: Vec<u8>) -> Result<Vec<u8>> {
    let encoded = thdat_rle::encode(&data)?;
    drop(data);

    entry.compressed_size = encoded.len() as u64;
    entry.method = EntryMethod::Rle;
    Ok(encoded)
}
