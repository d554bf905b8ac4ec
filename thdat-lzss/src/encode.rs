//! LZSS encoder.
//!
//! The encoder works on a linear history made of one dictionary's worth of
//! zeros followed by the input. The zero prefix mirrors the decoder's
//! zero-filled dictionary, so matches may start inside it, and a linear
//! history makes overlapping matches (distance shorter than length) fall out
//! of plain slice comparison.
//!
//! Match search is greedy: at each position the longest candidate wins, and
//! among equally long candidates the one at the shortest distance is kept.
//! Candidates come from hash chains ordered from the most recent position
//! backwards, so the first candidate of a given length is also the closest.

use crate::params::LzssParams;
use thdat_core::MsbBitWriter;
use thdat_core::error::{Result, try_alloc};

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 1 << 15;

/// Hash mask.
const HASH_MASK: usize = HASH_SIZE - 1;

/// Empty chain link.
const NIL: u32 = u32::MAX;

/// LZSS token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzssToken {
    /// A literal byte.
    Literal(u8),
    /// A copy from the dictionary.
    Match {
        /// Absolute dictionary slot the copy starts at (never 0).
        position: u16,
        /// Number of bytes to copy.
        length: u8,
    },
}

/// LZSS encoder.
#[derive(Debug)]
pub struct LzssEncoder {
    params: LzssParams,
    /// Hash table: most recent history index per hash.
    head: Vec<u32>,
    /// Hash chain: previous history index with the same hash.
    prev: Vec<u32>,
}

impl LzssEncoder {
    /// Create a new LZSS encoder.
    pub fn new(params: LzssParams) -> Self {
        Self {
            params,
            head: vec![NIL; HASH_SIZE],
            prev: Vec::new(),
        }
    }

    /// Parameters this encoder emits.
    pub fn params(&self) -> &LzssParams {
        &self.params
    }

    #[inline]
    fn hash(bytes: &[u8]) -> usize {
        let h = ((bytes[0] as usize) << 10) ^ ((bytes[1] as usize) << 5) ^ (bytes[2] as usize);
        h & HASH_MASK
    }

    fn insert(&mut self, history: &[u8], index: usize) {
        let min_match = self.params.min_match;
        if index + min_match <= history.len() {
            let h = Self::hash(&history[index..index + min_match]);
            self.prev[index] = self.head[h];
            self.head[h] = index as u32;
        }
    }

    /// Find the best match for `history[cur..]`, returning `(index, length)`.
    fn find_match(&self, history: &[u8], cur: usize) -> Option<(usize, usize)> {
        let min_match = self.params.min_match;
        let max_len = (history.len() - cur).min(self.params.max_match());
        if max_len < min_match {
            return None;
        }

        let lookahead = &history[cur..cur + max_len];
        let mut best_len = min_match - 1;
        let mut best_index = 0usize;

        let mut candidate = self.head[Self::hash(lookahead)];
        while candidate != NIL {
            let index = candidate as usize;
            if cur - index > self.params.max_distance() {
                break;
            }

            // Slot 0 is the terminator position and cannot be referenced.
            if self.params.slot_of(index) != 0 {
                let len = history[index..]
                    .iter()
                    .zip(lookahead)
                    .take_while(|(a, b)| a == b)
                    .count();

                if len > best_len {
                    best_len = len;
                    best_index = index;
                    if len >= max_len {
                        break;
                    }
                }
            }

            candidate = self.prev[index];
        }

        if best_len >= min_match {
            Some((best_index, best_len))
        } else {
            None
        }
    }

    /// Split `data` into literal and match tokens.
    pub fn tokenize(&mut self, data: &[u8]) -> Result<Vec<LzssToken>> {
        let mut tokens = Vec::new();
        self.run(data, |token| {
            tokens.push(token);
            Ok(())
        })?;
        Ok(tokens)
    }

    /// Compress `data` into a complete, terminated LZSS stream.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let params = self.params;
        let output = try_alloc(params.max_encoded_len(data.len()))?;
        let mut writer = MsbBitWriter::with_buffer(output);

        self.run(data, |token| write_token(&mut writer, &params, token))?;

        // Terminator: match flag with position 0.
        writer.write_bit(false)?;
        writer.write_bits(0, params.position_bits)?;

        Ok(writer.into_vec())
    }

    fn run<F>(&mut self, data: &[u8], mut emit: F) -> Result<()>
    where
        F: FnMut(LzssToken) -> Result<()>,
    {
        let prefix = self.params.dict_size();
        let mut history = try_alloc(prefix + data.len())?;
        history.resize(prefix, 0);
        history.extend_from_slice(data);

        self.head.fill(NIL);
        self.prev.clear();
        self.prev.resize(history.len(), NIL);

        for index in 0..prefix {
            self.insert(&history, index);
        }

        let mut cur = prefix;
        while cur < history.len() {
            let advance = match self.find_match(&history, cur) {
                Some((index, length)) => {
                    emit(LzssToken::Match {
                        position: self.params.slot_of(index) as u16,
                        length: length as u8,
                    })?;
                    length
                }
                None => {
                    emit(LzssToken::Literal(history[cur]))?;
                    1
                }
            };

            for index in cur..cur + advance {
                self.insert(&history, index);
            }
            cur += advance;
        }

        Ok(())
    }
}

impl Default for LzssEncoder {
    fn default() -> Self {
        Self::new(LzssParams::THDAT)
    }
}

fn write_token(writer: &mut MsbBitWriter, params: &LzssParams, token: LzssToken) -> Result<()> {
    match token {
        LzssToken::Literal(byte) => {
            writer.write_bit(true)?;
            writer.write_bits(byte as u16, 8)?;
        }
        LzssToken::Match { position, length } => {
            writer.write_bit(false)?;
            writer.write_bits(position, params.position_bits)?;
            writer.write_bits(
                (length as usize - params.min_match) as u16,
                params.length_bits,
            )?;
        }
    }
    Ok(())
}

/// Compress `data` with the dat LZSS parameters.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let compressed = LzssEncoder::default().encode(data)?;
    log::trace!("lzss: {} -> {} bytes", data.len(), compressed.len());
    Ok(compressed)
}
