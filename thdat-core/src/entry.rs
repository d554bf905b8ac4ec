//! Archive entry metadata.
//!
//! An [`Entry`] describes one logical file packed into a dat archive: its
//! name, its raw size, the number of bytes actually stored, and where those
//! bytes begin inside the container.

use crate::error::{Result, ThdatError};

/// Codec that produced the stored bytes of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMethod {
    /// Raw bytes, no compression.
    #[default]
    Stored,
    /// Run-length encoded.
    Rle,
    /// LZSS compressed.
    Lzss,
}

impl EntryMethod {
    /// Check if this method is "stored" (no compression).
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }

    /// Get the method name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stored => "Stored",
            Self::Rle => "RLE",
            Self::Lzss => "LZSS",
        }
    }
}

impl std::fmt::Display for EntryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Character encoding used when a table layer stores entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameEncoding {
    /// Names are stored as UTF-8.
    Utf8,
    /// Names are stored as Shift_JIS (older dialects).
    #[default]
    ShiftJis,
}

/// An entry in a dat archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The name of the entry within the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Number of bytes stored in the container (zsize).
    pub compressed_size: u64,
    /// Codec that produced the stored bytes.
    pub method: EntryMethod,
    /// Absolute position of the stored bytes in the container.
    ///
    /// `None` until the entry has been written.
    pub offset: Option<u64>,
}

impl Entry {
    /// Create a new file entry.
    ///
    /// The compressed size starts out equal to the raw size, which is what the
    /// stored path writes.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            compressed_size: size,
            method: EntryMethod::Stored,
            offset: None,
        }
    }

    /// Builder method to set compression method.
    pub fn with_method(mut self, method: EntryMethod) -> Self {
        self.method = method;
        self
    }

    /// Builder method to set compressed size.
    pub fn with_compressed_size(mut self, size: u64) -> Self {
        self.compressed_size = size;
        self
    }

    /// Check if the entry has been assigned a container offset.
    pub fn is_written(&self) -> bool {
        self.offset.is_some()
    }

    /// First byte past the stored data, if written.
    pub fn end_offset(&self) -> Option<u64> {
        self.offset.map(|offset| offset + self.compressed_size)
    }

    /// Get the compression ratio (compressed/uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.size as f64
        }
    }

    /// Get the space savings as a percentage.
    pub fn space_savings(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            (1.0 - self.compression_ratio()) * 100.0
        }
    }

    /// Render the name as the bytes a table layer stores.
    ///
    /// Shift_JIS names that contain characters outside the code page are
    /// rejected rather than replaced, since a lossy name would no longer
    /// match the file the game asks for.
    pub fn encoded_name(&self, encoding: NameEncoding) -> Result<Vec<u8>> {
        match encoding {
            NameEncoding::Utf8 => Ok(self.name.as_bytes().to_vec()),
            NameEncoding::ShiftJis => {
                let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(&self.name);
                if had_errors {
                    return Err(ThdatError::encoding_error(format!(
                        "entry name {:?} is not representable in Shift_JIS",
                        self.name
                    )));
                }
                Ok(bytes.into_owned())
            }
        }
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::file("", 0)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{:#010x} ", offset)?,
            None => write!(f, "{:>10} ", "-")?,
        }
        write!(
            f,
            "{:>10} {:>10} {:>6.1}% {:<6} {}",
            self.size,
            self.compressed_size,
            self.space_savings(),
            self.method,
            self.name
        )
    }
}
