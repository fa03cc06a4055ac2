//! Parameter sets and the (category, block count) registry.
//!
//! Every instance of the scheme is described by one immutable [`ParameterSet`].
//! The registry is plain static data: three tables (category 1, categories 2/3,
//! categories 4/5) with one entry per circulant block count N0 ∈ {2, 3, 4}.

use sha3::{Digest, Sha3_256, Sha3_384, Sha3_512};

use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Hash function bound to a parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashFunction {
    /// SHA3-256, 32-byte digest
    Sha3_256,
    /// SHA3-384, 48-byte digest
    Sha3_384,
    /// SHA3-512, 64-byte digest
    Sha3_512,
}

impl HashFunction {
    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            HashFunction::Sha3_256 => 32,
            HashFunction::Sha3_384 => 48,
            HashFunction::Sha3_512 => 64,
        }
    }

    /// Hash `data` and return the digest bytes.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Sha3_256 => Sha3_256::digest(data).to_vec(),
            HashFunction::Sha3_384 => Sha3_384::digest(data).to_vec(),
            HashFunction::Sha3_512 => Sha3_512::digest(data).to_vec(),
        }
    }
}

/// One instance of the cryptosystem.
///
/// All derived lengths are `const fn`s so that they can be evaluated on the
/// static registry entries.
#[derive(Debug, PartialEq, Eq)]
pub struct ParameterSet {
    /// Security category the entry was dimensioned for (1, 3 or 5)
    pub category: u8,
    /// Number of circulant blocks in a codeword, denoted `n0`
    pub block_count: usize,
    /// Circulant size, denoted `p`. Odd.
    pub block_size: usize,
    /// Weight of each circulant block of H, denoted `dv`
    pub row_weight: usize,
    /// Weights of the circulant blocks of a row of Q, by relative offset
    pub block_weights: &'static [usize],
    /// Weight of the error vector, denoted `t`
    pub error_weight: usize,
    /// Raw capacity of the constant-weight encoder in bits
    pub max_encodable_bits: usize,
    /// Hash used by the padding transform
    pub hash: HashFunction,
    /// Length in bytes of the private key seed and the encryption seed
    pub seed_len: usize,
    /// (syndrome weight lower bound, flip threshold), increasing in both fields
    pub threshold_table: &'static [(u32, u32)],
}

/// Minimum number of bits spent on the plaintext padding marker.
pub(crate) const DOMAIN_SEPARATION_MIN_BITS: usize = 2;

impl ParameterSet {
    /// Registry lookup.
    ///
    /// Categories 2 and 3 share one table, as do categories 4 and 5.
    pub fn get(category: u8, block_count: usize) -> Result<&'static ParameterSet> {
        let table: &'static [ParameterSet; 3] = match category {
            1 => &CATEGORY_1,
            2 | 3 => &CATEGORY_3,
            4 | 5 => &CATEGORY_5,
            _ => {
                return Err(Error::ParameterRange {
                    category,
                    block_count,
                });
            }
        };
        match block_count {
            2..=4 => Ok(&table[block_count - 2]),
            _ => Err(Error::ParameterRange {
                category,
                block_count,
            }),
        }
    }

    /// Information word length, `(n0 - 1) * p`
    pub const fn k(&self) -> usize {
        (self.block_count - 1) * self.block_size
    }

    /// Codeword length, `n0 * p`
    pub const fn n(&self) -> usize {
        self.block_count * self.block_size
    }

    /// Weight of a full row of Q
    pub const fn m(&self) -> usize {
        let mut sum = 0;
        let mut i = 0;
        while i < self.block_weights.len() {
            sum += self.block_weights[i];
            i += 1;
        }
        sum
    }

    /// Constant-weight capacity with a 1/30 margin against worst-case inefficiency
    pub const fn cw_bit_budget(&self) -> usize {
        self.max_encodable_bits - self.max_encodable_bits / 30
    }

    /// Bits of the working buffer fed to the constant-weight encoder.
    ///
    /// Trimmed so that `cw_payload_bits + k` is a whole number of bytes.
    pub const fn cw_payload_bits(&self) -> usize {
        let budget = self.cw_bit_budget();
        budget - (budget + self.k()) % 8
    }

    /// Length of the working buffer in bits. Always a multiple of 8.
    pub const fn buffer_bits(&self) -> usize {
        self.cw_payload_bits() + self.k()
    }

    /// Digest length in bytes
    pub const fn digest_len(&self) -> usize {
        self.hash.output_len()
    }

    /// Largest plaintext, in bits, that fits in one ciphertext
    pub const fn max_plaintext_bits(&self) -> usize {
        self.k() + self.cw_payload_bits() - 8 * self.digest_len() - DOMAIN_SEPARATION_MIN_BITS
    }

    /// Weight of the circulant block at (`row`, `col`) of Q
    pub const fn q_block_weight(&self, row: usize, col: usize) -> usize {
        self.block_weights[(col + self.block_count - row) % self.block_count]
    }

    /// Flip threshold for a syndrome of the given weight.
    ///
    /// Picks the last table entry whose lower bound does not exceed `syndrome_weight`.
    pub fn threshold_for(&self, syndrome_weight: u32) -> u32 {
        let idx = self
            .threshold_table
            .partition_point(|&(lower_bound, _)| lower_bound <= syndrome_weight);
        self.threshold_table[idx.saturating_sub(1)].1
    }
}

static THRESHOLDS_1_2: [(u32, u32); 5] = [(0, 43), (2843, 44), (4392, 45), (5193, 46), (5672, 47)];
static THRESHOLDS_1_3: [(u32, u32); 6] = [
    (0, 49),
    (2509, 50),
    (3124, 51),
    (3478, 52),
    (3695, 53),
    (3878, 54),
];
static THRESHOLDS_1_4: [(u32, u32); 7] = [
    (0, 53),
    (2021, 54),
    (2611, 55),
    (2957, 56),
    (3181, 57),
    (3345, 58),
    (3447, 59),
];

static THRESHOLDS_3_2: [(u32, u32); 9] = [
    (0, 61),
    (3957, 62),
    (6698, 63),
    (8128, 64),
    (8978, 65),
    (9578, 66),
    (9981, 67),
    (10286, 68),
    (10533, 69),
];
static THRESHOLDS_3_3: [(u32, u32); 9] = [
    (0, 71),
    (4255, 72),
    (5492, 73),
    (6203, 74),
    (6666, 75),
    (7021, 76),
    (7271, 77),
    (7466, 78),
    (7617, 79),
];
static THRESHOLDS_3_4: [(u32, u32); 9] = [
    (0, 71),
    (3244, 72),
    (4359, 73),
    (5006, 74),
    (5408, 75),
    (5712, 76),
    (5915, 77),
    (6094, 78),
    (6230, 79),
];

static THRESHOLDS_5_2: [(u32, u32); 11] = [
    (0, 74),
    (5742, 75),
    (10032, 76),
    (12263, 77),
    (13621, 78),
    (14538, 79),
    (15211, 80),
    (15706, 81),
    (16091, 82),
    (16391, 83),
    (16640, 84),
];
static THRESHOLDS_5_3: [(u32, u32); 10] = [
    (0, 88),
    (6551, 89),
    (8560, 90),
    (9789, 91),
    (10536, 92),
    (11123, 93),
    (11519, 94),
    (11837, 95),
    (12091, 96),
    (12319, 97),
];
static THRESHOLDS_5_4: [(u32, u32); 10] = [
    (0, 88),
    (4788, 89),
    (6581, 90),
    (7620, 91),
    (8300, 92),
    (8782, 93),
    (9121, 94),
    (9386, 95),
    (9593, 96),
    (9780, 97),
];

/// Category 1 parameter sets, indexed by `n0 - 2`
pub static CATEGORY_1: [ParameterSet; 3] = [
    ParameterSet {
        category: 1,
        block_count: 2,
        block_size: 15013,
        row_weight: 9,
        block_weights: &[5, 4],
        error_weight: 143,
        max_encodable_bits: 1304,
        hash: HashFunction::Sha3_256,
        seed_len: 24,
        threshold_table: &THRESHOLDS_1_2,
    },
    ParameterSet {
        category: 1,
        block_count: 3,
        block_size: 9643,
        row_weight: 13,
        block_weights: &[3, 2, 2],
        error_weight: 90,
        max_encodable_bits: 874,
        hash: HashFunction::Sha3_256,
        seed_len: 24,
        threshold_table: &THRESHOLDS_1_3,
    },
    ParameterSet {
        category: 1,
        block_count: 4,
        block_size: 8467,
        row_weight: 11,
        block_weights: &[3, 2, 2, 2],
        error_weight: 72,
        max_encodable_bits: 738,
        hash: HashFunction::Sha3_256,
        seed_len: 24,
        threshold_table: &THRESHOLDS_1_4,
    },
];

/// Category 2 and 3 parameter sets, indexed by `n0 - 2`
pub static CATEGORY_3: [ParameterSet; 3] = [
    ParameterSet {
        category: 3,
        block_count: 2,
        block_size: 24533,
        row_weight: 13,
        block_weights: &[5, 4],
        error_weight: 208,
        max_encodable_bits: 1933,
        hash: HashFunction::Sha3_384,
        seed_len: 32,
        threshold_table: &THRESHOLDS_3_2,
    },
    ParameterSet {
        category: 3,
        block_count: 3,
        block_size: 17827,
        row_weight: 15,
        block_weights: &[4, 3, 2],
        error_weight: 129,
        max_encodable_bits: 1302,
        hash: HashFunction::Sha3_384,
        seed_len: 32,
        threshold_table: &THRESHOLDS_3_3,
    },
    ParameterSet {
        category: 3,
        block_count: 4,
        block_size: 14717,
        row_weight: 15,
        block_weights: &[3, 2, 2, 2],
        error_weight: 104,
        max_encodable_bits: 1096,
        hash: HashFunction::Sha3_384,
        seed_len: 32,
        threshold_table: &THRESHOLDS_3_4,
    },
];

/// Category 4 and 5 parameter sets, indexed by `n0 - 2`
pub static CATEGORY_5: [ParameterSet; 3] = [
    ParameterSet {
        category: 5,
        block_count: 2,
        block_size: 37619,
        row_weight: 11,
        block_weights: &[7, 6],
        error_weight: 272,
        max_encodable_bits: 2592,
        hash: HashFunction::Sha3_512,
        seed_len: 40,
        threshold_table: &THRESHOLDS_5_2,
    },
    ParameterSet {
        category: 5,
        block_count: 3,
        block_size: 28477,
        row_weight: 13,
        block_weights: &[5, 4, 4],
        error_weight: 172,
        max_encodable_bits: 1783,
        hash: HashFunction::Sha3_512,
        seed_len: 40,
        threshold_table: &THRESHOLDS_5_3,
    },
    ParameterSet {
        category: 5,
        block_count: 4,
        block_size: 22853,
        row_weight: 13,
        block_weights: &[4, 3, 3, 3],
        error_weight: 135,
        max_encodable_bits: 1459,
        hash: HashFunction::Sha3_512,
        seed_len: 40,
        threshold_table: &THRESHOLDS_5_4,
    },
];

/// Every registered parameter set, for iteration in tests and benches
pub fn all() -> impl Iterator<Item = &'static ParameterSet> {
    CATEGORY_1.iter().chain(CATEGORY_3.iter()).chain(CATEGORY_5.iter())
}
