//! Private matrix expansion and public key derivation.
//!
//! A private key is a seed. Expanding it with SHAKE256 yields, in order:
//! - `n0` circulant rows of weight `dv` (the transposed parity-check rows HT),
//! - the `n0 x n0` sub-blocks of Q, row major, with weights `q_block_weight(i, j)`.
//!
//! From those, H is HT with negated exponents and row i of L is
//! `sum_j H_j * Q_{j,i}`.

use alloc::vec;
use alloc::vec::Vec;

use crate::ParameterSet;
use crate::gf2x::{DensePoly, SparsePoly};
use crate::xof::{PRIVATE_MATRICES_DOMAIN_SEP, Xof};

// Barrett reduction for runtime moduli: q = (x * floor(2^32 / p)) >> 32 is
// floor(x / p) or one less, so a single conditional subtraction finishes the
// reduction for any x below the 24-bit rejection threshold.

const BARRETT_SHIFT: u64 = 32;

/// Largest multiple of `p` that fits in 24 bits. Samples at or above it are redrawn.
const fn rejection_threshold_24bit(p: u32) -> u32 {
    let max_24bit = (1u32 << 24) - 1;
    (max_24bit / p) * p
}

#[inline]
fn reduce_mod_p(x: u32, p: u32) -> u32 {
    debug_assert!(x < rejection_threshold_24bit(p));
    let multiplier = (1u64 << BARRETT_SHIFT) / u64::from(p);
    let q = (u64::from(x) * multiplier) >> BARRETT_SHIFT;
    let mut res = x - (q as u32) * p;
    if res >= p {
        res -= p;
    }
    res
}

/// Draw `weight` distinct exponents in [0, p) from the stream.
///
/// 24-bit big-endian samples are read in batches of `3 * weight` bytes,
/// samples above the rejection threshold and duplicates are skipped.
pub(crate) fn sample_support(xof: &mut Xof, weight: usize, p: usize) -> SparsePoly {
    let p = p as u32;
    let threshold = rejection_threshold_24bit(p);

    let mut random_bytes = vec![0u8; 3 * weight.max(1)];
    let batch_size = random_bytes.len();
    let mut byte_idx = batch_size;

    let mut support: Vec<u32> = Vec::with_capacity(weight);
    while support.len() < weight {
        if byte_idx + 3 > batch_size {
            xof.squeeze(&mut random_bytes);
            byte_idx = 0;
        }

        let sample = (u32::from(random_bytes[byte_idx]) << 16)
            | (u32::from(random_bytes[byte_idx + 1]) << 8)
            | u32::from(random_bytes[byte_idx + 2]);
        byte_idx += 3;

        if sample >= threshold {
            continue;
        }
        let pos = reduce_mod_p(sample, p);
        if !support.contains(&pos) {
            support.push(pos);
        }
    }

    SparsePoly::from_positions(support)
}

/// The sparse matrices a private key seed expands into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateMatrices {
    /// Transposed parity-check circulants, as sampled, one per block
    pub ht: Vec<SparsePoly>,
    /// Parity-check circulants: exponents of `ht` negated mod p
    pub h: Vec<SparsePoly>,
    /// `q[row][col]`, weight `q_block_weight(row, col)`
    pub q: Vec<Vec<SparsePoly>>,
    /// `l[i] = sum_j h[j] * q[j][i]`, capacity `dv * m`
    pub l: Vec<SparsePoly>,
}

impl PrivateMatrices {
    /// Deterministically expand a private key seed.
    pub fn expand(params: &ParameterSet, seed: &[u8]) -> Self {
        let n0 = params.block_count;
        let p = params.block_size;
        let mut xof = Xof::init(seed, PRIVATE_MATRICES_DOMAIN_SEP);

        let ht: Vec<SparsePoly> = (0..n0)
            .map(|_| sample_support(&mut xof, params.row_weight, p))
            .collect();
        let h: Vec<SparsePoly> = ht.iter().map(|row| row.negate(p)).collect();

        let q: Vec<Vec<SparsePoly>> = (0..n0)
            .map(|row| {
                (0..n0)
                    .map(|col| sample_support(&mut xof, params.q_block_weight(row, col), p))
                    .collect()
            })
            .collect();

        let l = (0..n0)
            .map(|i| {
                (0..n0).fold(SparsePoly::new(0), |acc, j| acc.add(&h[j].mul(&q[j][i], p)))
            })
            .collect();

        Self { ht, h, q, l }
    }

    /// Public key blocks: `transpose(L_{n0-1}^-1 * L_i)` for `i < n0 - 1`.
    pub(crate) fn public_blocks(&self, params: &ParameterSet) -> Vec<DensePoly> {
        let p = params.block_size;
        let last = &self.l[params.block_count - 1];
        let inverse = DensePoly::from_sparse(last, p).inverse();

        self.l[..params.block_count - 1]
            .iter()
            .map(|row| inverse.mul_sparse(row).transpose())
            .collect()
    }
}
