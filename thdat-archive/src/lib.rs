//! # thdat Archive
//!
//! The engine that assembles dat containers.
//!
//! A caller opens an [`Archive`] over an output handle, registers entries,
//! reads each input (raw through [`read_file`] or compressed through
//! [`read_file_lzss`]), optionally runs the [`rle`] pass, and writes the result
//! with [`Archive::write_entry`], which assigns the entry its offset. Once all
//! entries are written, [`Archive::sort`] puts them in on-disk order for the
//! table layer, which plugs in through the [`Packer`] trait.
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use thdat_archive::{Archive, Version, read_file, rle};
//! use thdat_core::Entry;
//!
//! let mut archive = Archive::open(Vec::new(), Version::Th04, 0, 1).unwrap();
//! let index = archive.add_entry(Entry::file("title.pi", 8)).unwrap();
//!
//! let raw = read_file(archive.entry(index).unwrap(), &mut Cursor::new([0u8; 8])).unwrap();
//! let packed = rle(archive.entry_mut(index).unwrap(), raw).unwrap();
//! archive.write_entry(index, packed).unwrap();
//!
//! archive.sort();
//! assert_eq!(archive.entries()[0].offset, Some(0));
//! assert_eq!(archive.running_offset(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod packer;
pub mod read;
pub mod version;

// Re-exports
pub use archive::Archive;
pub use packer::{Packer, pack};
pub use read::{read_file, read_file_lzss, rle};
pub use version::{EntryCodec, Version};
