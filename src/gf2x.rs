//! Circulant polynomial arithmetic in GF(2)[x]/(x^p - 1).
//!
//! Two representations are used side by side:
//! - [`DensePoly`]: all p coefficients packed into `u64` words, bit k of the
//!   vector is the coefficient of x^k. Bits at positions >= p are always zero.
//! - [`SparsePoly`]: the sorted list of exponents carrying a one, with an
//!   explicit fixed capacity. Used for the low-weight private matrices.
//!
//! Addition is XOR, multiplication is cyclic convolution reduced mod 2.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::AddAssign;

#[inline]
fn words_for(bits: usize) -> usize {
    bits.div_ceil(64)
}

/// Multiples of one 64-bit word by every 4-bit value.
///
/// A 64x64 carry-less product is assembled nibble by nibble from the top,
/// Horner style, so it never exceeds 127 bits.
struct NibbleTable {
    rows: [u128; 16],
}

impl NibbleTable {
    #[inline]
    fn new(a: u64) -> Self {
        let a = u128::from(a);
        let mut rows = [0u128; 16];
        for (i, row) in rows.iter_mut().enumerate() {
            for b in 0..4 {
                if (i >> b) & 1 == 1 {
                    *row ^= a << b;
                }
            }
        }
        Self { rows }
    }

    #[inline]
    fn mul_word(&self, b: u64) -> u128 {
        let mut acc = 0u128;
        for k in (0..16).rev() {
            let nibble = ((b >> (4 * k)) & 0xF) as usize;
            acc = (acc << 4) ^ self.rows[nibble];
        }
        acc
    }
}

/// Fold a product of up to `2p - 1` bits back onto p bits: x^p = 1.
///
/// `wide` holds `2 * words_for(p)` words.
fn reduce(wide: &[u64], p: usize) -> Vec<u64> {
    let n_words = words_for(p);
    let shift = p % 64;
    debug_assert!(shift != 0, "p is odd");
    debug_assert_eq!(wide.len(), 2 * n_words);

    let mut out = vec![0u64; n_words];
    for i in 0..n_words {
        let r = wide[i + n_words - 1] >> shift;
        let carry = wide[i + n_words] << (64 - shift);
        out[i] = wide[i] ^ r ^ carry;
    }
    out[n_words - 1] &= (1u64 << shift) - 1;
    out
}

/// Multiply by x^shift in place, dropping whatever leaves the buffer.
fn shl_in_place(words: &mut [u64], shift: usize) {
    if shift == 0 {
        return;
    }
    let word_shift = shift / 64;
    let bit_shift = shift % 64;
    for i in (0..words.len()).rev() {
        let mut v = 0;
        if i >= word_shift {
            v = words[i - word_shift] << bit_shift;
            if bit_shift != 0 && i > word_shift {
                v |= words[i - word_shift - 1] >> (64 - bit_shift);
            }
        }
        words[i] = v;
    }
}

/// Multiply by x, keeping `bits` bits.
fn shl1(words: &mut [u64], bits: usize) {
    let mut carry = 0;
    for w in words.iter_mut() {
        let next = *w >> 63;
        *w = (*w << 1) | carry;
        carry = next;
    }
    let rem = bits % 64;
    if rem != 0 {
        let last = words.len() - 1;
        words[last] &= (1u64 << rem) - 1;
    }
}

#[inline]
fn bit(words: &[u64], k: usize) -> bool {
    (words[k / 64] >> (k % 64)) & 1 == 1
}

#[inline]
fn xor_into(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

/// Element of GF(2)[x]/(x^p - 1) stored as its coefficient vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensePoly {
    words: Vec<u64>,
    p: usize,
}

impl DensePoly {
    /// The zero polynomial.
    pub fn zero(p: usize) -> Self {
        Self {
            words: vec![0u64; words_for(p)],
            p,
        }
    }

    /// The multiplicative identity.
    pub fn one(p: usize) -> Self {
        let mut out = Self::zero(p);
        out.words[0] = 1;
        out
    }

    /// Dense form of a sparse polynomial.
    pub fn from_sparse(sparse: &SparsePoly, p: usize) -> Self {
        let mut out = Self::zero(p);
        for &pos in sparse.positions() {
            out.flip(pos as usize);
        }
        out
    }

    /// The modulus exponent p.
    pub fn block_size(&self) -> usize {
        self.p
    }

    /// Coefficient of x^k.
    #[inline]
    pub fn coeff(&self, k: usize) -> bool {
        bit(&self.words, k)
    }

    /// Toggle the coefficient of x^k.
    #[inline]
    pub fn flip(&mut self, k: usize) {
        debug_assert!(k < self.p);
        self.words[k / 64] ^= 1u64 << (k % 64);
    }

    /// Number of non-zero coefficients.
    pub fn weight(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// True for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Exponents with a non-zero coefficient, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            let mut w = w;
            core::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let tz = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(i * 64 + tz)
            })
        })
    }

    /// Schoolbook cyclic convolution, one 64x64 carry-less multiply per word pair.
    ///
    /// Every word pair is processed, so the running time does not depend on the
    /// operand contents.
    pub fn mul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.p, other.p);
        let n_words = self.words.len();

        let mut mul_res = vec![0u64; 2 * n_words];
        for i in 0..n_words {
            let table = NibbleTable::new(self.words[i]);
            for (j, &b) in other.words.iter().enumerate() {
                let prod = table.mul_word(b);
                mul_res[i + j] ^= prod as u64;
                mul_res[i + j + 1] ^= (prod >> 64) as u64;
            }
        }

        Self {
            words: reduce(&mul_res, self.p),
            p: self.p,
        }
    }

    /// Multiply by a sparse polynomial in O(p * weight).
    ///
    /// A copy of `self` is shifted along a 2p-bit buffer by the gaps between
    /// consecutive exponents of `sparse` and accumulated; the two halves of the
    /// accumulator are then folded together.
    pub fn mul_sparse(&self, sparse: &SparsePoly) -> Self {
        let n_words = self.words.len();
        let mut aux = vec![0u64; 2 * n_words];
        aux[..n_words].copy_from_slice(&self.words);
        let mut acc = vec![0u64; 2 * n_words];

        let mut prev = 0usize;
        for &pos in sparse.positions() {
            let pos = pos as usize;
            shl_in_place(&mut aux, pos - prev);
            prev = pos;
            xor_into(&mut acc, &aux);
        }

        Self {
            words: reduce(&acc, self.p),
            p: self.p,
        }
    }

    /// Multiplicative inverse mod x^p - 1.
    ///
    /// Binary "almost inverse" iteration on (u, v, r, s), exactly 2p steps.
    /// r and s hold p + 1 coefficients, bit p being the one inspected. The input
    /// must be invertible (odd weight and coprime to the cyclotomic factor);
    /// the result is meaningless otherwise.
    pub fn inverse(&self) -> Self {
        let p = self.p;
        let wide_bits = p + 1;

        let mut u = Self::one(p).words;
        let mut v = vec![0u64; u.len()];
        let mut r = vec![0u64; words_for(wide_bits)];
        r[..self.words.len()].copy_from_slice(&self.words);
        let mut s = vec![0u64; words_for(wide_bits)];
        s[0] = 1;
        s[p / 64] |= 1u64 << (p % 64);

        let mut delta = 0usize;
        for _ in 0..2 * p {
            if !bit(&r, p) {
                shl1(&mut r, wide_bits);
                rotate_left1(&mut u, p);
                delta += 1;
            } else {
                if bit(&s, p) {
                    xor_into(&mut s, &r);
                    xor_into(&mut v, &u);
                }
                shl1(&mut s, wide_bits);
                if delta == 0 {
                    core::mem::swap(&mut r, &mut s);
                    core::mem::swap(&mut u, &mut v);
                    rotate_left1(&mut u, p);
                    delta = 1;
                } else {
                    rotate_right1(&mut u, p);
                    delta -= 1;
                }
            }
        }

        Self { words: u, p }
    }

    /// Transpose of the circulant matrix: coefficient k moves to -k mod p.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zero(self.p);
        for k in self.ones() {
            out.flip((self.p - k) % self.p);
        }
        out
    }
}

impl AddAssign<&DensePoly> for DensePoly {
    fn add_assign(&mut self, rhs: &DensePoly) {
        debug_assert_eq!(self.p, rhs.p);
        xor_into(&mut self.words, &rhs.words);
    }
}

/// Multiply by x mod x^p - 1.
fn rotate_left1(words: &mut [u64], p: usize) {
    let top = bit(words, p - 1);
    shl1(words, p);
    if top {
        words[0] |= 1;
    }
}

/// Divide by x mod x^p - 1.
fn rotate_right1(words: &mut [u64], p: usize) {
    let low = words[0] & 1 == 1;
    let mut carry = 0;
    for w in words.iter_mut().rev() {
        let next = *w & 1;
        *w = (*w >> 1) | (carry << 63);
        carry = next;
    }
    if low {
        words[(p - 1) / 64] |= 1u64 << ((p - 1) % 64);
    }
}

/// Element of GF(2)[x]/(x^p - 1) stored as its support.
///
/// Exponents are kept ascending and distinct. `capacity` is the maximum weight
/// the value was sized for; it bounds the work of the merges that consume it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparsePoly {
    positions: Vec<u32>,
    capacity: usize,
}

impl SparsePoly {
    /// Empty polynomial able to hold `capacity` exponents.
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from distinct exponents in any order; capacity is their count.
    pub fn from_positions(mut positions: Vec<u32>) -> Self {
        positions.sort_unstable();
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        let capacity = positions.len();
        Self {
            positions,
            capacity,
        }
    }

    /// Exponents carrying a one, ascending.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Number of exponents actually present.
    pub fn weight(&self) -> usize {
        self.positions.len()
    }

    /// Maximum weight this value was sized for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Exponents mapped to -e mod p: the support of the transposed circulant.
    pub fn negate(&self, p: usize) -> Self {
        let p = p as u32;
        let mut out = Self::from_positions(self.positions.iter().map(|&e| (p - e) % p).collect());
        out.capacity = self.capacity;
        out
    }

    /// Product of two sparse polynomials.
    ///
    /// Every pairwise exponent sum is formed, the multiset is sorted and only
    /// exponents of odd multiplicity survive.
    pub fn mul(&self, other: &Self, p: usize) -> Self {
        let p = p as u32;
        let mut candidates = Vec::with_capacity(self.weight() * other.weight());
        for &a in &self.positions {
            for &b in &other.positions {
                candidates.push((a + b) % p);
            }
        }
        candidates.sort_unstable();

        let mut out = Self::new(self.capacity * other.capacity);
        let mut idx = 0;
        while idx < candidates.len() {
            let val = candidates[idx];
            let mut count = 0;
            while idx < candidates.len() && candidates[idx] == val {
                idx += 1;
                count += 1;
            }
            if count % 2 == 1 {
                out.positions.push(val);
            }
        }
        out
    }

    /// Sum of two sparse polynomials by sorted merge; shared exponents cancel.
    ///
    /// The result capacity is the sum of the input capacities.
    pub fn add(&self, other: &Self) -> Self {
        let a = &self.positions;
        let b = &other.positions;
        let mut out = Self::new(self.capacity + other.capacity);

        let (mut ia, mut ib) = (0, 0);
        while ia < a.len() && ib < b.len() {
            if a[ia] == b[ib] {
                ia += 1;
                ib += 1;
            } else if a[ia] < b[ib] {
                out.positions.push(a[ia]);
                ia += 1;
            } else {
                out.positions.push(b[ib]);
                ib += 1;
            }
        }
        out.positions.extend_from_slice(&a[ia..]);
        out.positions.extend_from_slice(&b[ib..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestRng;
    use rand_core::RngCore;
    use std::vec;

    const SMALL_P: usize = 11;
    const LARGE_P: usize = 15013;

    fn poly(p: usize, exps: &[usize]) -> DensePoly {
        let mut out = DensePoly::zero(p);
        for &e in exps {
            out.flip(e);
        }
        out
    }

    #[test]
    fn word_products() {
        let mut rng = TestRng::new();
        let mut cases = vec![(0, 0), (1, u64::MAX), (u64::MAX, u64::MAX), (1 << 63, 1 << 63)];
        for _ in 0..64 {
            cases.push((rng.next_u64(), rng.next_u64()));
        }
        for (a, b) in cases {
            let mut expected = 0u128;
            for k in 0..64 {
                if (b >> k) & 1 == 1 {
                    expected ^= u128::from(a) << k;
                }
            }
            assert_eq!(NibbleTable::new(a).mul_word(b), expected, "{a:#x} * {b:#x}");
        }
    }

    #[test]
    fn small_products() {
        let p = 7;
        // (1 + x)^2 = 1 + x^2
        let a = poly(p, &[0, 1]);
        assert_eq!(a.mul(&a), poly(p, &[0, 2]));
        // x^4 * x^5 = x^9 = x^2
        assert_eq!(poly(p, &[4]).mul(&poly(p, &[5])), poly(p, &[2]));
    }

    fn test_dense_ring_laws(p: usize) {
        let mut rng = TestRng::new();
        let a = rng.dense(p);
        let b = rng.dense(p);
        let c = rng.dense(p);

        assert_eq!(a.mul(&DensePoly::one(p)), a, "a * 1 should equal a");
        assert!(a.mul(&DensePoly::zero(p)).is_zero(), "a * 0 should equal 0");

        let ab = a.mul(&b);
        assert_eq!(ab, b.mul(&a), "a * b should equal b * a");
        assert_eq!(ab.mul(&c), a.mul(&b.mul(&c)), "(a * b) * c should equal a * (b * c)");

        let mut b_plus_c = b.clone();
        b_plus_c += &c;
        let mut right = ab.clone();
        right += &a.mul(&c);
        assert_eq!(a.mul(&b_plus_c), right, "a * (b + c) should equal a * b + a * c");
    }

    #[test]
    fn dense_ring_laws_small() {
        test_dense_ring_laws(SMALL_P);
        test_dense_ring_laws(127);
    }

    #[test]
    fn dense_ring_laws_large() {
        test_dense_ring_laws(LARGE_P);
    }

    #[test]
    fn multiplying_by_x_rotates() {
        let mut rng = TestRng::new();
        let a = rng.dense(LARGE_P);
        let mut words = a.words.clone();
        rotate_left1(&mut words, LARGE_P);
        assert_eq!(words, a.mul(&poly(LARGE_P, &[1])).words);
        rotate_right1(&mut words, LARGE_P);
        assert_eq!(words, a.words);
    }

    #[test]
    fn inverse_of_small_values() {
        let p = 3;
        assert_eq!(DensePoly::one(p).inverse(), DensePoly::one(p));
        assert_eq!(poly(p, &[1]).inverse(), poly(p, &[2]));

        let a = poly(SMALL_P, &[0, 1, 3]);
        assert_eq!(a.mul(&a.inverse()), DensePoly::one(SMALL_P));
    }

    #[test]
    fn inverse_of_sparse_odd_weight_values() {
        let mut rng = TestRng::new();
        for weight in [1, 11, 99] {
            let a = DensePoly::from_sparse(&rng.sparse(weight, LARGE_P), LARGE_P);
            let inv = a.inverse();
            assert_eq!(a.mul(&inv), DensePoly::one(LARGE_P), "weight {weight}");
        }
    }

    #[test]
    fn transpose_properties() {
        let mut rng = TestRng::new();
        let a = rng.dense(LARGE_P);
        let b = rng.dense(LARGE_P);
        assert_eq!(a.transpose().transpose(), a);
        assert_eq!(a.mul(&b).transpose(), a.transpose().mul(&b.transpose()));
        assert_eq!(poly(SMALL_P, &[0, 1, 4]).transpose(), poly(SMALL_P, &[0, 10, 7]));
    }

    #[test]
    fn dense_times_sparse_matches_dense_multiply() {
        let mut rng = TestRng::new();
        for p in [SMALL_P, 127, LARGE_P] {
            let d = rng.dense(p);
            for weight in [0, 1, 5, 9] {
                let s = rng.sparse(weight, p);
                assert_eq!(d.mul_sparse(&s), d.mul(&DensePoly::from_sparse(&s, p)));
            }
        }
    }

    #[test]
    fn sparse_multiply_matches_dense_multiply() {
        let mut rng = TestRng::new();
        let p = LARGE_P;
        let a = rng.sparse(9, p);
        let b = rng.sparse(5, p);
        let prod = a.mul(&b, p);

        assert_eq!(prod.capacity(), 45);
        assert!(prod.positions().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            DensePoly::from_sparse(&prod, p),
            DensePoly::from_sparse(&a, p).mul(&DensePoly::from_sparse(&b, p))
        );
    }

    #[test]
    fn sparse_multiply_cancels_even_multiplicities() {
        let p = SMALL_P;
        // (1 + x)(1 + x) = 1 + 2x + x^2 = 1 + x^2
        let a = SparsePoly::from_positions(vec![0, 1]);
        assert_eq!(a.mul(&a, p).positions(), &[0, 2]);
        // wraps around: x^10 * x^3 = x^2
        let b = SparsePoly::from_positions(vec![10]);
        let c = SparsePoly::from_positions(vec![3]);
        assert_eq!(b.mul(&c, p).positions(), &[2]);
    }

    #[test]
    fn sparse_add_merges_and_cancels() {
        let a = SparsePoly::from_positions(vec![1, 4, 7, 9]);
        let b = SparsePoly::from_positions(vec![0, 4, 9, 10]);
        let sum = a.add(&b);
        assert_eq!(sum.positions(), &[0, 1, 7, 10]);
        assert_eq!(sum.capacity(), 8);

        let empty = SparsePoly::new(3);
        let sum = empty.add(&a);
        assert_eq!(sum.positions(), a.positions());
        assert_eq!(sum.capacity(), 7);
        assert!(a.add(&a).positions().is_empty());
    }

    #[test]
    fn negate_is_transpose() {
        let mut rng = TestRng::new();
        let s = rng.sparse(13, LARGE_P);
        let negated = s.negate(LARGE_P);
        assert_eq!(
            DensePoly::from_sparse(&negated, LARGE_P),
            DensePoly::from_sparse(&s, LARGE_P).transpose()
        );
        assert_eq!(negated.capacity(), s.capacity());
    }

    #[test]
    fn ones_lists_support_ascending() {
        let a = poly(200, &[0, 63, 64, 130, 199]);
        let ones: std::vec::Vec<usize> = a.ones().collect();
        assert_eq!(ones, vec![0, 63, 64, 130, 199]);
        assert_eq!(a.weight(), 5);
    }
}
