//! # thdat LZSS
//!
//! The LZSS variant stored in dat archive entries.
//!
//! The stream is a sequence of MSB-first units. Each unit starts with a flag
//! bit: `1` is followed by a literal byte, `0` by a 13-bit absolute position in
//! an 8 KiB dictionary and a 4-bit match length. A position of zero ends the
//! stream. See [`LzssParams`] for the exact constants.
//!
//! ## Example
//!
//! ```rust
//! use thdat_lzss::{decode, encode};
//!
//! let input = b"Hello Hello Hello World";
//! let compressed = encode(input).unwrap();
//! let restored = decode(&compressed, input.len()).unwrap();
//! assert_eq!(restored, input);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod encode;
pub mod params;

// Re-exports
pub use decode::{LzssDecoder, decode};
pub use encode::{LzssEncoder, LzssToken, encode};
pub use params::LzssParams;
