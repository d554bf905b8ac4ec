//! Table-layer hook and the end-to-end packing driver.

use crate::archive::Archive;
use crate::version::Version;
use log::debug;
use std::io::{Read, Write};
use thdat_core::Entry;
use thdat_core::error::Result;

/// A version-specific header/table serializer.
///
/// The engine decides where entry data goes; a packer decides what the bytes
/// around it look like.
pub trait Packer<W: Write> {
    /// Format version this packer writes.
    fn version(&self) -> Version;

    /// Prepare `writer` for entry data and return the base offset.
    ///
    /// Implementations reserve whatever header space precedes the data and
    /// must leave the writer positioned at the returned offset.
    fn begin(&mut self, writer: &mut W, entry_count: usize) -> Result<u64>;

    /// Serialize the entry table once every entry is written and sorted.
    fn finish(&mut self, archive: &mut Archive<W>) -> Result<()>;
}

/// Pack every `(entry, reader)` input into `writer`.
///
/// Entries are compressed and written in input order, sorted by offset, and
/// then handed to `packer` for the table. The finished archive is returned so
/// the caller can flush or inspect it.
pub fn pack<W, P, R, I>(mut writer: W, packer: &mut P, inputs: I) -> Result<Archive<W>>
where
    W: Write,
    P: Packer<W> + ?Sized,
    R: Read,
    I: IntoIterator<Item = (Entry, R)>,
{
    let inputs: Vec<(Entry, R)> = inputs.into_iter().collect();
    let count = inputs.len();

    let base_offset = packer.begin(&mut writer, count)?;
    let mut archive = Archive::open(writer, packer.version(), base_offset, count as u64)?;

    let mut readers = Vec::with_capacity(count);
    for (entry, reader) in inputs {
        readers.push((archive.add_entry(entry)?, reader));
    }

    for (done, (index, mut reader)) in readers.into_iter().enumerate() {
        archive.compress_entry(index, &mut reader)?;
        if let Some(entry) = archive.entry(index) {
            debug!("[{}/{}] {}", done + 1, count, entry);
        }
    }

    archive.sort();
    packer.finish(&mut archive)?;
    debug!(
        "packed {} entries, {} data bytes",
        count,
        archive.data_len()
    );

    Ok(archive)
}
