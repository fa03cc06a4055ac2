use rand_chacha::rand_core::{CryptoRng, RngCore, SeedableRng};

use crate::gf2x::{DensePoly, SparsePoly};
use std::vec::Vec;

/// Deterministic RNG for repeatable tests
pub struct TestRng {
    rng: rand_chacha::ChaCha8Rng,
}
impl TestRng {
    pub fn new() -> Self {
        let rng = rand_chacha::ChaCha8Rng::seed_from_u64(0xdead_beef);
        Self { rng }
    }
    pub fn gen_usize(&mut self, upper: usize) -> usize {
        (self.rng.next_u32() as usize) % upper
    }

    /// Uniformly random polynomial with p coefficients
    pub fn dense(&mut self, p: usize) -> DensePoly {
        let mut out = DensePoly::zero(p);
        for k in 0..p {
            if self.rng.next_u32() & 1 == 1 {
                out.flip(k);
            }
        }
        out
    }

    /// Random polynomial with exactly `weight` distinct exponents below p
    pub fn sparse(&mut self, weight: usize, p: usize) -> SparsePoly {
        let mut positions: Vec<u32> = Vec::with_capacity(weight);
        while positions.len() < weight {
            let pos = self.gen_usize(p) as u32;
            if !positions.contains(&pos) {
                positions.push(pos);
            }
        }
        SparsePoly::from_positions(positions)
    }
}

impl Default for TestRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_chacha::rand_core::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl CryptoRng for TestRng {}
