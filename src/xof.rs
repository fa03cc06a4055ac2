//! Seeded byte streams.
//!
//! Every deterministic expansion of a seed goes through SHAKE256 with a
//! one-byte domain separator appended to the seed:
//! - the private key seed expands into the sparse private matrices,
//! - the encryption seed expands into the plaintext mask.

use sha3::digest::{ExtendableOutput, XofReader};
use sha3::{Shake256, Shake256Reader};

pub(crate) const PRIVATE_MATRICES_DOMAIN_SEP: u8 = 0;
pub(crate) const MASK_DOMAIN_SEP: u8 = 1;

pub struct Xof {
    reader: Shake256Reader,
}

impl Xof {
    pub fn init(seed: &[u8], domain_sep: u8) -> Self {
        let mut hasher = Shake256::default();
        sha3::digest::Update::update(&mut hasher, seed);
        sha3::digest::Update::update(&mut hasher, &[domain_sep]);
        let reader = hasher.finalize_xof();
        Self { reader }
    }

    pub fn squeeze(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }
}

/// XOR `len(out)` bytes of the mask stream derived from `seed` into `out`.
pub(crate) fn xor_mask(seed: &[u8], out: &mut [u8]) {
    let mut xof = Xof::init(seed, MASK_DOMAIN_SEP);
    let mut block = [0u8; 136];
    for chunk in out.chunks_mut(block.len()) {
        let block = &mut block[..chunk.len()];
        xof.squeeze(block);
        for (dst, src) in chunk.iter_mut().zip(block.iter()) {
            *dst ^= *src;
        }
    }
}
