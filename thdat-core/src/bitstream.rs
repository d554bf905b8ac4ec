//! MSB-first bit stream operations.
//!
//! The dat LZSS stream packs its flag bits, literals, dictionary positions and
//! match lengths starting from the most significant bit of each byte. The
//! final byte is padded with zero bits.

use crate::error::{Result, ThdatError};

/// Widest field either side of the stream handles in one call.
pub const MAX_FIELD_BITS: u8 = 16;

fn check_width(count: u8) -> Result<()> {
    if count == 0 || count > MAX_FIELD_BITS {
        return Err(ThdatError::invalid_argument(format!(
            "bit width {} outside 1..={}",
            count, MAX_FIELD_BITS
        )));
    }
    Ok(())
}

/// MSB-first bit reader over an in-memory buffer.
#[derive(Debug)]
pub struct MsbBitReader<'a> {
    data: &'a [u8],
    /// Absolute position of the next bit.
    bit_pos: usize,
}

impl<'a> MsbBitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Read a `count`-bit field, most significant bit first.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        check_width(count)?;
        let end = self.bit_pos + count as usize;
        if end > self.data.len() * 8 {
            return Err(ThdatError::corrupted(
                self.data.len() as u64,
                format!(
                    "bit stream ended at bit {} reading a {}-bit field",
                    self.bit_pos, count
                ),
            ));
        }

        let mut value = 0u16;
        while self.bit_pos < end {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            value = (value << 1) | bit as u16;
            self.bit_pos += 1;
        }
        Ok(value)
    }

    /// Read a single flag bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Number of input bytes touched so far, counting a partial byte.
    pub fn bytes_consumed(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }
}

/// MSB-first bit writer collecting into a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct MsbBitWriter {
    output: Vec<u8>,
    /// Byte being filled, aligned to the low bits.
    pending: u8,
    /// Bits already placed in `pending` (0..8).
    filled: u8,
}

impl MsbBitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer that appends to `output`, usually pre-reserved.
    pub fn with_buffer(output: Vec<u8>) -> Self {
        Self {
            output,
            pending: 0,
            filled: 0,
        }
    }

    /// Write the low `count` bits of `value`, most significant bit first.
    pub fn write_bits(&mut self, value: u16, count: u8) -> Result<()> {
        check_width(count)?;
        for shift in (0..count).rev() {
            let bit = ((value >> shift) & 1) as u8;
            self.pending = (self.pending << 1) | bit;
            self.filled += 1;
            if self.filled == 8 {
                self.output.push(self.pending);
                self.pending = 0;
                self.filled = 0;
            }
        }
        Ok(())
    }

    /// Write a single flag bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u16, 1)
    }

    /// Pad the partial byte with zero bits and emit it.
    pub fn flush(&mut self) {
        if self.filled > 0 {
            self.output.push(self.pending << (8 - self.filled));
            self.pending = 0;
            self.filled = 0;
        }
    }

    /// Flush and return the output data.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }
}
