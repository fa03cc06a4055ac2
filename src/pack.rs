//! Wire packing of circulant blocks.
//!
//! Bits are packed MSB first. Each P-bit block is written highest
//! coefficient first: wire bit j of a block is the coefficient of x^(P-1-j).
//! The concatenated blocks are followed by an end marker: a one, zeros, and a
//! final one in the last bit of the last byte. The marker always spans at
//! least 8 bits.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::gf2x::DensePoly;

#[inline]
pub(crate) fn get_bit(bytes: &[u8], idx: usize) -> bool {
    (bytes[idx / 8] >> (7 - idx % 8)) & 1 == 1
}

#[inline]
pub(crate) fn set_bit(bytes: &mut [u8], idx: usize) {
    bytes[idx / 8] |= 0x80 >> (idx % 8);
}

#[inline]
pub(crate) fn clear_bit(bytes: &mut [u8], idx: usize) {
    bytes[idx / 8] &= !(0x80 >> (idx % 8));
}

/// Byte length of `bits` payload bits plus their end marker.
pub(crate) const fn padded_len(bits: usize) -> usize {
    let pad = (8 - bits % 8) % 8 + 8;
    (bits + pad) / 8
}

/// Index of the last set bit, scanning backwards.
pub(crate) fn last_set_bit(bytes: &[u8]) -> Option<usize> {
    let idx = bytes.iter().rposition(|&b| b != 0)?;
    Some(idx * 8 + 7 - bytes[idx].trailing_zeros() as usize)
}

/// Serialize `blocks` in wire order and append the end marker.
pub(crate) fn pack_blocks(blocks: &[DensePoly]) -> Vec<u8> {
    let p = blocks.first().map_or(0, DensePoly::block_size);
    let bits = blocks.len() * p;
    let mut out = vec![0u8; padded_len(bits)];

    for (i, block) in blocks.iter().enumerate() {
        let base = i * p;
        for k in block.ones() {
            set_bit(&mut out, base + p - 1 - k);
        }
    }
    set_bit(&mut out, bits);
    let end = out.len() * 8 - 1;
    set_bit(&mut out, end);
    out
}

/// Parse `count` blocks of `p` coefficients written by [`pack_blocks`].
///
/// `what` names the object in length errors.
pub(crate) fn unpack_blocks(
    bytes: &[u8],
    count: usize,
    p: usize,
    what: &'static str,
) -> Result<Vec<DensePoly>> {
    let bits = count * p;
    let expected = padded_len(bits);
    if bytes.len() != expected {
        return Err(Error::InvalidLength {
            what,
            expected,
            actual: bytes.len(),
        });
    }

    let mut buf = bytes.to_vec();
    let last = buf.len() * 8 - 1;
    if !get_bit(&buf, last) {
        return Err(Error::MalformedPadding);
    }
    clear_bit(&mut buf, last);
    if last_set_bit(&buf) != Some(bits) {
        return Err(Error::MalformedPadding);
    }

    let mut blocks = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * p;
        let mut block = DensePoly::zero(p);
        for j in 0..p {
            if get_bit(&buf, base + j) {
                block.flip(p - 1 - j);
            }
        }
        blocks.push(block);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestRng;

    #[test]
    fn marker_length() {
        assert_eq!(padded_len(0), 1);
        assert_eq!(padded_len(5), 2);
        assert_eq!(padded_len(8), 2);
        assert_eq!(padded_len(9), 3);
        assert_eq!(padded_len(16), 3);
    }

    #[test]
    fn single_block_layout() {
        // 1 + x^4 over p = 5: wire bits 10001, marker 1, zeros, final 1
        let mut block = DensePoly::zero(5);
        block.flip(0);
        block.flip(4);
        assert_eq!(hex::encode(pack_blocks(&[block.clone()])), "8c01");

        // x^3 alone: wire bit 1
        let mut block = DensePoly::zero(5);
        block.flip(3);
        assert_eq!(hex::encode(pack_blocks(&[block])), "4401");
    }

    #[test]
    fn byte_aligned_payload_gets_a_marker_byte() {
        // two blocks of 4 coefficients fill one byte, the marker byte is 1000_0001
        let mut first = DensePoly::zero(4);
        first.flip(3);
        let mut second = DensePoly::zero(4);
        second.flip(0);
        let bytes = pack_blocks(&[first.clone(), second.clone()]);
        assert_eq!(hex::encode(&bytes), "8181");
        assert_eq!(unpack_blocks(&bytes, 2, 4, "test").unwrap(), [first, second]);
    }

    #[test]
    fn blocks_survive_packing() {
        let mut rng = TestRng::new();
        let p = 9643;
        let blocks = [rng.dense(p), rng.dense(p), rng.dense(p)];
        let bytes = pack_blocks(&blocks);
        assert_eq!(bytes.len(), padded_len(3 * p));
        assert_eq!(unpack_blocks(&bytes, 3, p, "test").unwrap(), blocks);
    }

    #[test]
    fn unpack_rejects_bad_input() {
        let bytes = hex::decode("8c01").unwrap();
        assert_eq!(
            unpack_blocks(&bytes[..1], 1, 5, "test"),
            Err(Error::InvalidLength {
                what: "test",
                expected: 2,
                actual: 1
            })
        );
        // final marker bit missing
        assert_eq!(
            unpack_blocks(&hex::decode("8c00").unwrap(), 1, 5, "test"),
            Err(Error::MalformedPadding)
        );
        // leading marker bit moved into the padding
        assert_eq!(
            unpack_blocks(&hex::decode("8881").unwrap(), 1, 5, "test"),
            Err(Error::MalformedPadding)
        );
        // leading marker bit missing
        assert_eq!(
            unpack_blocks(&hex::decode("8801").unwrap(), 1, 5, "test"),
            Err(Error::MalformedPadding)
        );
    }
}
