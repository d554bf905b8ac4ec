//! Error types for thdat operations.
//!
//! Every step of the packing pipeline reports failure through [`ThdatError`].
//! There is no shared error state: each call returns its own `Result`, and a
//! failed step leaves the archive unusable for further writes.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// The main error type for thdat operations.
#[derive(Debug, Error)]
pub enum ThdatError {
    /// I/O error from the underlying reader/writer, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A buffer could not be obtained.
    #[error("Allocation failed: could not reserve {requested} bytes")]
    Allocation {
        /// Number of bytes that were requested.
        requested: usize,
    },

    /// A parameter was malformed or a caller contract was violated.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// Archive format version is not one of the known dialects.
    #[error("Unsupported archive version: {version}")]
    UnsupportedVersion {
        /// The numeric version tag.
        version: u32,
    },

    /// Compressed input is malformed.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Entry name cannot be represented in the requested encoding.
    #[error("Encoding error: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },
}

/// Result type alias for thdat operations.
pub type Result<T> = std::result::Result<T, ThdatError>;

impl ThdatError {
    /// Create an allocation error.
    pub fn allocation(requested: usize) -> Self {
        Self::Allocation { requested }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(version: u32) -> Self {
        Self::UnsupportedVersion { version }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Check whether this error came from the underlying handle.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Allocate an empty buffer able to hold `len` bytes without reallocating.
///
/// Reservation failure is reported as [`ThdatError::Allocation`] instead of
/// aborting the process.
pub fn try_alloc(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_: TryReserveError| ThdatError::allocation(len))?;
    Ok(buf)
}
