//! LZSS decoder.

use crate::params::LzssParams;
use thdat_core::MsbBitReader;
use thdat_core::error::{Result, ThdatError, try_alloc};

/// LZSS decoder over a fixed, zero-initialized dictionary.
#[derive(Debug)]
pub struct LzssDecoder {
    params: LzssParams,
    /// Dictionary addressed by absolute slot.
    dict: Vec<u8>,
    /// Slot receiving the next output byte.
    head: usize,
}

impl LzssDecoder {
    /// Create a new LZSS decoder.
    pub fn new(params: LzssParams) -> Self {
        Self {
            params,
            dict: vec![0; params.dict_size()],
            head: params.initial_head,
        }
    }

    /// Reset the decoder.
    pub fn reset(&mut self) {
        self.dict.fill(0);
        self.head = self.params.initial_head;
    }

    #[inline]
    fn put(&mut self, output: &mut Vec<u8>, byte: u8) {
        output.push(byte);
        self.dict[self.head] = byte;
        self.head = (self.head + 1) & self.params.dict_mask();
    }

    /// Decode a complete stream that expands to exactly `size` bytes.
    pub fn decode(&mut self, data: &[u8], size: usize) -> Result<Vec<u8>> {
        self.reset();

        let params = self.params;
        let mut output = try_alloc(size)?;
        let mut reader = MsbBitReader::new(data);

        loop {
            if reader.read_bit()? {
                let byte = reader.read_bits(8)? as u8;
                self.put(&mut output, byte);
            } else {
                let position = reader.read_bits(params.position_bits)? as usize;
                if position == 0 {
                    break;
                }
                let length = reader.read_bits(params.length_bits)? as usize + params.min_match;
                for i in 0..length {
                    let byte = self.dict[(position + i) & params.dict_mask()];
                    self.put(&mut output, byte);
                }
            }

            if output.len() > size {
                return Err(ThdatError::corrupted(
                    reader.bytes_consumed() as u64,
                    format!("stream expands past the declared {} bytes", size),
                ));
            }
        }

        if output.len() != size {
            return Err(ThdatError::corrupted(
                reader.bytes_consumed() as u64,
                format!("stream ended after {} of {} bytes", output.len(), size),
            ));
        }

        Ok(output)
    }
}

impl Default for LzssDecoder {
    fn default() -> Self {
        Self::new(LzssParams::THDAT)
    }
}

/// Decompress a dat LZSS stream of known raw size.
pub fn decode(data: &[u8], size: usize) -> Result<Vec<u8>> {
    LzssDecoder::default().decode(data, size)
}
