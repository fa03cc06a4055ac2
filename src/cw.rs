//! Constant-weight codec.
//!
//! Maps a bit string onto an error vector of exactly `t` ones spread over
//! `n0` circulant blocks and back. The distances between consecutive ones are
//! Golomb-coded: a unary quotient followed by a truncated-binary remainder
//! whose modulus `d` is re-estimated from the positions and ones left.

use alloc::vec;
use alloc::vec::Vec;

use crate::ParameterSet;
use crate::error::{Error, Result};
use crate::gf2x::DensePoly;
use crate::pack::{get_bit, set_bit};

/// Golomb modulus `d` and its bit length `u` for the next gap.
///
/// `d = trunc(ln(2) * (available - (ones - 1) / 2) / ones)`.
pub(crate) fn split_parameters(available: i64, ones: i64) -> (u64, u32) {
    let d = (0.69315 * (available as f64 - (ones as f64 - 1.0) / 2.0) / ones as f64) as u64;
    (d, u64::BITS - d.leading_zeros())
}

/// MSB-first reader over the first `len` bits of a byte slice, zeros past the end.
struct BitReader<'a> {
    bytes: &'a [u8],
    len: usize,
    cursor: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8], len: usize) -> Self {
        debug_assert!(len <= bytes.len() * 8);
        Self {
            bytes,
            len,
            cursor: 0,
        }
    }

    fn read_bit(&mut self) -> u64 {
        if self.cursor >= self.len {
            return 0;
        }
        let b = get_bit(self.bytes, self.cursor);
        self.cursor += 1;
        u64::from(b)
    }

    fn read_bits(&mut self, count: u32) -> u64 {
        (0..count).fold(0, |acc, _| (acc << 1) | self.read_bit())
    }

    fn exhausted(&self) -> bool {
        self.cursor >= self.len
    }
}

/// MSB-first writer into a zeroed byte slice, dropping bits past `len`.
struct BitWriter<'a> {
    bytes: &'a mut [u8],
    len: usize,
    cursor: usize,
}

impl<'a> BitWriter<'a> {
    fn write_bit(&mut self, bit: bool) {
        if bit && self.cursor < self.len {
            set_bit(self.bytes, self.cursor);
        }
        self.cursor += 1;
    }

    fn write_bits(&mut self, value: u64, count: u32) {
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }
}

/// Constant-weight encoder and decoder.
pub struct ConstantWeight;

impl ConstantWeight {
    /// Encode the first `bit_len` bits of `bits` into `n0` blocks holding
    /// exactly `t` ones in total.
    ///
    /// Returns `None` when this input cannot be carried: the gaps overrun the
    /// available positions, a run of ones is met where only a zero gap is
    /// encodable, or the ones are all placed before the whole input was read.
    pub fn encode(params: &ParameterSet, bits: &[u8], bit_len: usize) -> Option<Vec<DensePoly>> {
        let t = params.error_weight;
        let p = params.block_size;
        let n = params.n();

        let mut reader = BitReader::new(bits, bit_len);
        let mut gaps = vec![0u64; t];
        let mut available = n as i64;
        let mut ones = t as i64;
        let mut idx = 0;

        while idx < t && available > ones {
            let (d, u) = split_parameters(available, ones);

            let mut quotient = 0u64;
            while reader.read_bit() == 1 {
                quotient += 1;
            }
            if d == 0 && quotient > 0 {
                return None;
            }

            let mut distance = if u > 0 { reader.read_bits(u - 1) } else { 0 };
            let fold = (1u64 << u) - d;
            if distance >= fold {
                distance = 2 * distance + reader.read_bit() - fold;
            }

            let gap = distance + quotient * d;
            gaps[idx] = gap;
            available -= gap as i64 + 1;
            ones -= 1;
            idx += 1;
        }

        // available == ones leaves the remaining gaps at zero
        if available < ones || !reader.exhausted() {
            return None;
        }

        let mut blocks = vec![DensePoly::zero(p); params.block_count];
        let mut pos: i64 = -1;
        for gap in gaps {
            pos += gap as i64 + 1;
            if pos >= n as i64 {
                return None;
            }
            let pos = pos as usize;
            blocks[pos / p].flip(pos % p);
        }
        Some(blocks)
    }

    /// Recover the bits carried by `blocks` into the zeroed `out`, keeping the
    /// first `bit_len` of them.
    pub fn decode(
        params: &ParameterSet,
        blocks: &[DensePoly],
        out: &mut [u8],
        bit_len: usize,
    ) -> Result<()> {
        let t = params.error_weight;
        let p = params.block_size;

        let weight = blocks.iter().map(|b| b.weight() as usize).sum::<usize>();
        if weight != t {
            return Err(Error::ErrorWeight {
                expected: t,
                actual: weight,
            });
        }

        let mut gaps = Vec::with_capacity(t);
        let mut last: i64 = -1;
        for (i, block) in blocks.iter().enumerate() {
            for k in block.ones() {
                let pos = (i * p + k) as i64;
                gaps.push((pos - last - 1) as u64);
                last = pos;
            }
        }

        let mut writer = BitWriter {
            bytes: out,
            len: bit_len,
            cursor: 0,
        };
        let mut available = params.n() as i64;
        let mut ones = t as i64;
        for gap in gaps {
            let (d, u) = split_parameters(available, ones);

            if d == 0 {
                writer.write_bit(false);
            } else {
                for _ in 0..gap / d {
                    writer.write_bit(true);
                }
                writer.write_bit(false);

                let remainder = gap % d;
                let fold = (1u64 << u) - d;
                if remainder < fold {
                    writer.write_bits(remainder, u.saturating_sub(1));
                } else {
                    writer.write_bits(remainder + fold, u);
                }
            }

            available -= gap as i64 + 1;
            ones -= 1;
        }
        Ok(())
    }
}
