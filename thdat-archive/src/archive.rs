//! The archive being assembled.
//!
//! An [`Archive`] owns the output handle and the entry collection, and tracks
//! the running offset: the container position the next entry's bytes land
//! at. [`Archive::write_entry`] is the only place offsets are assigned, so
//! the invariant
//!
//! ```text
//! running_offset == base_offset + sum(compressed_size of written entries)
//! ```
//!
//! holds after every successful write.
//!
//! Sorting is a separate step. Entries stay in registration order until
//! [`Archive::sort`] is called, so callers can report progress in processing
//! order and then sort before handing the table to the serializer.

use crate::read::{read_file, read_file_lzss};
use crate::version::{EntryCodec, Version};
use log::debug;
use std::io::{Read, Write};
use thdat_core::error::{Result, ThdatError};
use thdat_core::{Entry, EntryMethod};

/// A dat container being written.
#[derive(Debug)]
pub struct Archive<W: Write> {
    writer: W,
    version: Version,
    base_offset: u64,
    running_offset: u64,
    entries: Vec<Entry>,
}

impl<W: Write> Archive<W> {
    /// Open an archive over `writer`.
    ///
    /// Entry data starts at `base_offset`; the space before it is left to the
    /// table layer, and nothing is written here. Storage for `count` entries
    /// is reserved up front.
    pub fn open(writer: W, version: Version, base_offset: u64, count: u64) -> Result<Self> {
        let count = usize::try_from(count).map_err(|_| {
            ThdatError::invalid_argument(format!("entry count {} does not fit in memory", count))
        })?;
        let bytes = count
            .checked_mul(std::mem::size_of::<Entry>())
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| {
                ThdatError::invalid_argument(format!("entry count {} is too large", count))
            })?;

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| ThdatError::allocation(bytes))?;

        debug!(
            "opened {} archive: base offset {:#x}, {} entries expected",
            version, base_offset, count
        );

        Ok(Self {
            writer,
            version,
            base_offset,
            running_offset: base_offset,
            entries,
        })
    }

    /// Format version the table layer will write.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Offset where entry data begins.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Offset the next written entry will receive.
    pub fn running_offset(&self) -> u64 {
        self.running_offset
    }

    /// Bytes of entry data written so far.
    pub fn data_len(&self) -> u64 {
        self.running_offset - self.base_offset
    }

    /// Entries in their current order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries the collection can hold without reallocating.
    pub fn entry_capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Get an entry by index.
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Get a mutable entry by index.
    ///
    /// Returns `None` for written entries, which are frozen.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index).filter(|entry| !entry.is_written())
    }

    /// Get a mutable reference to the output handle.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the archive and return the output handle, unflushed.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Register an entry and return its index.
    pub fn add_entry(&mut self, entry: Entry) -> Result<usize> {
        if entry.is_written() {
            return Err(ThdatError::invalid_argument(format!(
                "entry {:?} already has an offset",
                entry.name
            )));
        }
        if self.entries.len() == self.entries.capacity() {
            self.entries
                .try_reserve(1)
                .map_err(|_| ThdatError::allocation(std::mem::size_of::<Entry>()))?;
        }
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    fn entry_index_error(&self, index: usize) -> ThdatError {
        ThdatError::invalid_argument(format!(
            "entry index {} out of range ({} entries)",
            index,
            self.entries.len()
        ))
    }

    /// Write `data` as the stored bytes of entry `index`, consuming it.
    ///
    /// `data` must be exactly `compressed_size` bytes long; a mismatch is
    /// rejected before any state changes. On success the entry's offset is
    /// the previous running offset and the running offset has advanced by
    /// `compressed_size`.
    ///
    /// If the write itself fails the offset bookkeeping has already moved
    /// and is not rolled back. The archive must be abandoned.
    pub fn write_entry(&mut self, index: usize, data: Vec<u8>) -> Result<()> {
        let offset = self.running_offset;
        let Some(entry) = self.entries.get_mut(index) else {
            return Err(self.entry_index_error(index));
        };

        if entry.is_written() {
            return Err(ThdatError::invalid_argument(format!(
                "entry {:?} was already written",
                entry.name
            )));
        }
        if data.len() as u64 != entry.compressed_size {
            return Err(ThdatError::invalid_argument(format!(
                "entry {:?}: buffer holds {} bytes but compressed size is {}",
                entry.name,
                data.len(),
                entry.compressed_size
            )));
        }
        let next = offset.checked_add(entry.compressed_size).ok_or_else(|| {
            ThdatError::invalid_argument(format!("entry {:?} overflows the container", entry.name))
        })?;

        entry.offset = Some(offset);
        self.running_offset = next;
        debug!(
            "writing {:?} at {:#x} ({} -> {} bytes, {})",
            entry.name, offset, entry.size, entry.compressed_size, entry.method
        );

        self.writer.write_all(&data)?;
        Ok(())
    }

    /// Read, compress and write entry `index` with this version's codec.
    ///
    /// LZSS output is always kept. RLE output is kept only when it is smaller
    /// than the raw data; otherwise the raw bytes are stored.
    ///
    /// A written entry is rejected before `reader` is touched.
    pub fn compress_entry<R: Read + ?Sized>(&mut self, index: usize, reader: &mut R) -> Result<()> {
        let codec = self.version.codec();
        let Some(entry) = self.entries.get_mut(index) else {
            return Err(self.entry_index_error(index));
        };
        if entry.is_written() {
            return Err(ThdatError::invalid_argument(format!(
                "entry {:?} was already written",
                entry.name
            )));
        }

        let data = match codec {
            EntryCodec::Lzss => {
                let data = read_file_lzss(entry, reader)?;
                entry.compressed_size = data.len() as u64;
                entry.method = EntryMethod::Lzss;
                data
            }
            EntryCodec::Rle => {
                let raw = read_file(entry, reader)?;
                let encoded = thdat_rle::encode(&raw)?;
                if encoded.len() < raw.len() {
                    entry.compressed_size = encoded.len() as u64;
                    entry.method = EntryMethod::Rle;
                    encoded
                } else {
                    entry.compressed_size = entry.size;
                    entry.method = EntryMethod::Stored;
                    raw
                }
            }
        };

        self.write_entry(index, data)
    }

    /// Stable sort of the entries by ascending offset.
    ///
    /// Unwritten entries go after all written ones, keeping their relative
    /// order. The output handle is not touched.
    pub fn sort(&mut self) {
        self.entries
            .sort_by_key(|entry| (entry.offset.is_none(), entry.offset));
        debug!("sorted {} entries by offset", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn archive(base: u64, count: u64) -> Archive<Cursor<Vec<u8>>> {
        let mut cursor = Cursor::new(vec![0u8; base as usize]);
        cursor.set_position(base);
        Archive::open(cursor, Version::Th08, base, count).unwrap()
    }

    #[test]
    fn test_open() {
        let archive = archive(64, 3);
        assert_eq!(archive.running_offset(), 64);
        assert_eq!(archive.base_offset(), 64);
        assert!(archive.entry_capacity() >= 3);
        assert!(archive.entries().is_empty());
        assert_eq!(archive.into_inner().into_inner().len(), 64);
    }

    #[test]
    fn test_open_rejects_huge_count() {
        let err = Archive::open(Vec::new(), Version::Th06, 0, u64::MAX).unwrap_err();
        assert!(matches!(err, ThdatError::InvalidArgument { .. }));
    }

    #[test]
    fn test_sequential_offsets() {
        let mut archive = archive(64, 3);
        for (name, size) in [("a", 10u64), ("b", 20), ("c", 5)] {
            let index = archive.add_entry(Entry::file(name, size)).unwrap();
            archive.write_entry(index, vec![0xEE; size as usize]).unwrap();
        }

        let offsets: Vec<_> = archive.entries().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![Some(64), Some(74), Some(94)]);
        assert_eq!(archive.running_offset(), 99);
        assert_eq!(archive.data_len(), 35);
        assert_eq!(archive.into_inner().into_inner().len(), 99);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut archive = archive(16, 1);
        let index = archive.add_entry(Entry::file("a", 8)).unwrap();

        let err = archive.write_entry(index, vec![0; 7]).unwrap_err();
        assert!(matches!(err, ThdatError::InvalidArgument { .. }));
        assert_eq!(archive.running_offset(), 16);
        assert!(!archive.entry(index).unwrap().is_written());
    }

    #[test]
    fn test_double_write_rejected() {
        let mut archive = archive(0, 1);
        let index = archive.add_entry(Entry::file("a", 2)).unwrap();
        archive.write_entry(index, vec![1, 2]).unwrap();
        assert!(archive.write_entry(index, vec![1, 2]).is_err());
        assert_eq!(archive.running_offset(), 2);
    }

    #[test]
    fn test_unknown_index() {
        let mut archive = archive(0, 0);
        assert!(matches!(
            archive.write_entry(3, Vec::new()),
            Err(ThdatError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_sort_by_offset() {
        let mut archive = archive(64, 3);
        let a = archive.add_entry(Entry::file("a", 5)).unwrap();
        let b = archive.add_entry(Entry::file("b", 10)).unwrap();
        let c = archive.add_entry(Entry::file("c", 20)).unwrap();

        archive.write_entry(b, vec![0; 10]).unwrap();
        archive.write_entry(c, vec![0; 20]).unwrap();
        archive.write_entry(a, vec![0; 5]).unwrap();

        let offsets: Vec<_> = archive.entries().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![Some(94), Some(64), Some(74)]);

        archive.sort();
        let sorted: Vec<_> = archive
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.offset, e.compressed_size))
            .collect();
        assert_eq!(
            sorted,
            vec![("b", Some(64), 10), ("c", Some(74), 20), ("a", Some(94), 5)]
        );
    }

    #[test]
    fn test_sort_puts_unwritten_last() {
        let mut archive = archive(0, 3);
        let first = archive.add_entry(Entry::file("pending1", 1)).unwrap();
        let written = archive.add_entry(Entry::file("written", 1)).unwrap();
        archive.add_entry(Entry::file("pending2", 1)).unwrap();
        archive.write_entry(written, vec![9]).unwrap();
        assert_eq!(first, 0);

        archive.sort();
        let names: Vec<_> = archive.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["written", "pending1", "pending2"]);
    }

    #[test]
    fn test_compress_entry_rle_fallback() {
        let mut archive = Archive::open(Vec::new(), Version::Th03, 0, 2).unwrap();
        let runs = archive.add_entry(Entry::file("runs", 64)).unwrap();
        let noise = archive.add_entry(Entry::file("noise", 6)).unwrap();

        archive
            .compress_entry(runs, &mut Cursor::new(vec![0u8; 64]))
            .unwrap();
        archive
            .compress_entry(noise, &mut Cursor::new(b"aabbcc".to_vec()))
            .unwrap();

        let runs = archive.entry(runs).unwrap().clone();
        assert_eq!(runs.method, EntryMethod::Rle);
        assert_eq!(runs.compressed_size, 3);
        assert_eq!(runs.offset, Some(0));

        let noise = archive.entry(noise).unwrap().clone();
        assert_eq!(noise.method, EntryMethod::Stored);
        assert_eq!(noise.compressed_size, 6);
        assert_eq!(noise.offset, Some(3));

        assert_eq!(archive.into_inner(), b"\x00\x00\x3eaabbcc");
    }

    #[test]
    fn test_compress_entry_rejects_written() {
        let mut archive = archive(64, 1);
        let index = archive.add_entry(Entry::file("a", 40)).unwrap();
        archive.write_entry(index, vec![7; 40]).unwrap();
        let before = archive.entry(index).unwrap().clone();

        let mut reader = Cursor::new(vec![0u8; 40]);
        let err = archive.compress_entry(index, &mut reader).unwrap_err();
        assert!(matches!(err, ThdatError::InvalidArgument { .. }));

        assert_eq!(archive.entry(index).unwrap(), &before);
        assert_eq!(reader.position(), 0);
        assert_eq!(archive.running_offset(), 104);
        assert_eq!(
            archive.running_offset(),
            archive.base_offset() + before.compressed_size
        );
    }

    #[test]
    fn test_entry_mut_frozen_after_write() {
        let mut archive = archive(0, 2);
        let written = archive.add_entry(Entry::file("a", 3)).unwrap();
        let pending = archive.add_entry(Entry::file("b", 3)).unwrap();
        archive.write_entry(written, vec![1, 2, 3]).unwrap();

        assert!(archive.entry_mut(written).is_none());
        assert!(archive.entry(written).is_some());

        archive.entry_mut(pending).unwrap().compressed_size = 2;
        archive.write_entry(pending, vec![4, 5]).unwrap();
        assert!(archive.entry_mut(pending).is_none());
        assert!(archive.entry_mut(9).is_none());
        assert_eq!(archive.running_offset(), 5);
    }

    #[test]
    fn test_compress_entry_lzss() {
        let data = b"ECL ECL ECL ECL ECL ECL ECL ECL".to_vec();
        let mut archive = Archive::open(Vec::new(), Version::Th07, 0, 1).unwrap();
        let index = archive.add_entry(Entry::file("st.ecl", data.len() as u64)).unwrap();
        archive
            .compress_entry(index, &mut Cursor::new(data.clone()))
            .unwrap();

        let entry = archive.entry(index).unwrap().clone();
        assert_eq!(entry.method, EntryMethod::Lzss);
        assert_eq!(archive.running_offset(), entry.compressed_size);

        let written = archive.into_inner();
        assert_eq!(written.len() as u64, entry.compressed_size);
        assert_eq!(thdat_lzss::decode(&written, data.len()).unwrap(), data);
    }
}
