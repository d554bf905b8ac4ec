//! # thdat Core
//!
//! Core components shared by the thdat codecs and the archive engine.
//!
//! - [`bitstream`]: MSB-first bit I/O for the LZSS flag/literal/match stream
//! - [`entry`]: Archive entry metadata (name, sizes, offset)
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Container                                               │
//! │     Archive engine, Packer trait (thdat-archive)        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec                                                   │
//! │     LZSS (thdat-lzss), RLE (thdat-rle)                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     MsbBitReader/MsbBitWriter, Entry, ThdatError        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use thdat_core::bitstream::{MsbBitReader, MsbBitWriter};
//! use thdat_core::Entry;
//!
//! let mut writer = MsbBitWriter::new();
//! writer.write_bits(0b1, 1).unwrap();
//! writer.write_bits(0x41, 8).unwrap();
//! let bytes = writer.into_vec();
//!
//! let mut reader = MsbBitReader::new(&bytes);
//! assert_eq!(reader.read_bits(1).unwrap(), 1);
//! assert_eq!(reader.read_bits(8).unwrap(), 0x41);
//!
//! let entry = Entry::file("stage1.ecl", 1024);
//! assert_eq!(entry.compressed_size, 1024);
//! assert!(!entry.is_written());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod entry;
pub mod error;

// Re-exports for convenience
pub use bitstream::{MsbBitReader, MsbBitWriter};
pub use entry::{Entry, EntryMethod, NameEncoding};
pub use error::{Result, ThdatError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{MsbBitReader, MsbBitWriter};
    pub use crate::entry::{Entry, EntryMethod};
    pub use crate::error::{Result, ThdatError};
}
