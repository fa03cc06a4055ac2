//! Bit-flipping decoder.
//!
//! Recovers a low-weight error vector from its private syndrome. Each round:
//! 1. counts, for every virtual parity check (row r, offset j), how many of
//!    the `dv` syndrome positions it covers are set,
//! 2. looks up the flip threshold for the current syndrome weight,
//! 3. sums those counts over the `m` checks tied to each error position and
//!    flips the positions whose sum exceeds the threshold.
//!
//! Counts are taken from a snapshot of the syndrome at the start of the round;
//! flips update the live syndrome. Not constant time.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::ParameterSet;
use crate::error::{Error, Result};
use crate::gf2x::DensePoly;
use crate::keygen::PrivateMatrices;

/// Round budget of the decoder
pub const MAX_ITERATIONS: usize = 15;

/// Iterative bit-flipping decoder.
pub struct BitFlipping;

impl BitFlipping {
    /// Find the `n0` error blocks whose private syndrome is `syndrome`.
    pub fn decode(
        params: &ParameterSet,
        matrices: &PrivateMatrices,
        mut syndrome: DensePoly,
    ) -> Result<Vec<DensePoly>> {
        let n0 = params.block_count;
        let p = params.block_size;

        let ht: Vec<Vec<usize>> = matrices
            .ht
            .iter()
            .map(|row| row.positions().iter().map(|&e| e as usize).collect())
            .collect();

        // checks tied to error block i: (row r, -q mod p) for every q in Q[r][i]
        let qt: Vec<Vec<(usize, usize)>> = (0..n0)
            .map(|i| {
                (0..n0)
                    .flat_map(|r| {
                        matrices.q[r][i]
                            .positions()
                            .iter()
                            .map(move |&q| (r, (p - q as usize) % p))
                    })
                    .collect()
            })
            .collect();

        let mut error = vec![DensePoly::zero(p); n0];
        let mut snapshot = vec![0u32; 2 * p];
        let mut upc = vec![vec![0u32; p]; n0];

        for round in 0..MAX_ITERATIONS {
            if syndrome.is_zero() {
                return Ok(error);
            }

            // doubled so that (h + j) never needs a reduction
            snapshot.fill(0);
            for k in syndrome.ones() {
                snapshot[k] = 1;
                snapshot[k + p] = 1;
            }
            for (counts, row) in upc.iter_mut().zip(ht.iter()) {
                for (j, count) in counts.iter_mut().enumerate() {
                    *count = row.iter().map(|&h| snapshot[h + j]).sum();
                }
            }

            let weight = syndrome.weight();
            let threshold = params.threshold_for(weight);

            let mut flips = 0usize;
            for (i, checks) in qt.iter().enumerate() {
                for j in 0..p {
                    let correlation: u32 = checks
                        .iter()
                        .map(|&(r, qneg)| upc[r][wrap(qneg + j, p)])
                        .sum();
                    if correlation <= threshold {
                        continue;
                    }

                    error[i].flip(j);
                    flips += 1;
                    for &(r, qneg) in checks {
                        let pos = wrap(qneg + j, p);
                        for &h in &ht[r] {
                            syndrome.flip(wrap(h + pos, p));
                        }
                    }
                }
            }

            trace!("round {round}: syndrome weight {weight}, threshold {threshold}, {flips} flips");
        }

        if syndrome.is_zero() {
            return Ok(error);
        }
        debug!(
            "decoder gave up after {MAX_ITERATIONS} rounds, syndrome weight {}",
            syndrome.weight()
        );
        Err(Error::DecodingFailure {
            rounds: MAX_ITERATIONS,
        })
    }
}

/// `x mod p` for `x < 2p`
#[inline]
fn wrap(x: usize, p: usize) -> usize {
    if x >= p { x - p } else { x }
}

/// Private syndrome of error blocks: `sum_i e_i * transpose(L_i)`.
#[cfg(test)]
pub(crate) fn syndrome_of(params: &ParameterSet, matrices: &PrivateMatrices, error: &[DensePoly]) -> DensePoly {
    let mut syndrome = DensePoly::zero(params.block_size);
    for (e, l) in error.iter().zip(matrices.l.iter()) {
        syndrome += &e.mul_sparse(&l.negate(params.block_size));
    }
    syndrome
}
