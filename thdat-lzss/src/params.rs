//! LZSS stream parameters.

/// LZSS configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzssParams {
    /// Bits used for a dictionary position (dictionary size is `1 << position_bits`).
    pub position_bits: u8,
    /// Bits used for the match length field.
    pub length_bits: u8,
    /// Shortest match worth encoding; shorter repeats are emitted as literals.
    pub min_match: usize,
    /// Dictionary slot that receives the first decoded byte.
    ///
    /// Slot 0 doubles as the end-of-stream position, so writing starts at 1.
    pub initial_head: usize,
}

impl LzssParams {
    /// Parameters used by the LZSS-era dat dialects.
    ///
    /// - 8 KiB zero-filled dictionary, 13-bit positions
    /// - 4-bit lengths covering 3..=18
    /// - first byte lands in slot 1
    pub const THDAT: Self = Self {
        position_bits: 13,
        length_bits: 4,
        min_match: 3,
        initial_head: 1,
    };

    /// Dictionary size in bytes.
    pub const fn dict_size(&self) -> usize {
        1 << self.position_bits
    }

    /// Mask applied to dictionary positions.
    pub const fn dict_mask(&self) -> usize {
        self.dict_size() - 1
    }

    /// Longest encodable match.
    pub const fn max_match(&self) -> usize {
        self.min_match + (1 << self.length_bits) - 1
    }

    /// Largest back-reference distance that still reads an intact slot.
    pub const fn max_distance(&self) -> usize {
        self.dict_size() - 1
    }

    /// Dictionary slot that holds stream byte `index` once it is produced.
    #[inline]
    pub const fn slot_of(&self, index: usize) -> usize {
        (index + self.initial_head) & self.dict_mask()
    }

    /// Upper bound on the encoded size of `len` input bytes.
    ///
    /// Every byte as a 9-bit literal plus the terminator unit, rounded up.
    pub const fn max_encoded_len(&self, len: usize) -> usize {
        let bits = len * 9 + 1 + self.position_bits as usize;
        bits.div_ceil(8)
    }
}

impl Default for LzssParams {
    fn default() -> Self {
        Self::THDAT
    }
}
