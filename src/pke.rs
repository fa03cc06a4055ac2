//! LEDA public-key encryption.
//!
//! McEliece-style encryption over a QC-LDPC code with a Kobara-Imai style
//! padding transform:
//! - the plaintext is padded into a working buffer, masked with a stream
//!   derived from a fresh seed and bound to that seed through a digest,
//! - the head of the buffer selects a constant-weight error vector,
//! - the tail is the information word, encoded systematically with the
//!   public key.
//!
//! Decryption recomputes the private syndrome, runs the bit-flipping decoder
//! and inverts every step, checking the digest bytes not covered by the seed.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::debug;
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::ParameterSet;
use crate::cw::ConstantWeight;
use crate::decoder::BitFlipping;
use crate::error::{Error, Result};
use crate::gf2x::DensePoly;
use crate::keygen::PrivateMatrices;
use crate::pack::{clear_bit, get_bit, last_set_bit, pack_blocks, padded_len, set_bit, unpack_blocks};
use crate::xof::xor_mask;

/// Fresh encryption seeds tried before giving up on the constant-weight encoder
pub const MAX_ENCODING_ATTEMPTS: usize = 64;

/// Public key: the `n0 - 1` dense blocks of the systematic generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    params: &'static ParameterSet,
    blocks: Vec<DensePoly>,
}

impl PublicKey {
    /// Parameter set this key belongs to.
    pub fn params(&self) -> &'static ParameterSet {
        self.params
    }

    /// Serialize: `k` bits, highest coefficient of each block first, then the end marker.
    pub fn to_bytes(&self) -> Vec<u8> {
        pack_blocks(&self.blocks)
    }

    /// Parse a public key, checking its length and end marker.
    pub fn from_bytes(params: &'static ParameterSet, bytes: &[u8]) -> Result<Self> {
        let blocks = unpack_blocks(bytes, params.block_count - 1, params.block_size, "public key")?;
        Ok(Self { params, blocks })
    }
}

/// Private key: the seed the private matrices expand from. Zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    params: &'static ParameterSet,
    seed: Vec<u8>,
}

impl PrivateKey {
    /// Parameter set this key belongs to.
    pub fn params(&self) -> &'static ParameterSet {
        self.params
    }

    /// View the seed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.seed
    }

    /// Serialize. The returned buffer is zeroized on drop.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.seed.clone())
    }

    /// Wrap `seed_len` seed bytes as a private key.
    pub fn from_bytes(params: &'static ParameterSet, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != params.seed_len {
            return Err(Error::InvalidLength {
                what: "private key",
                expected: params.seed_len,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            params,
            seed: bytes.to_vec(),
        })
    }
}

impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        Choice::from(u8::from(self.params == other.params)) & self.seed.ct_eq(&other.seed)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for PrivateKey {}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.seed.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("category", &self.params.category)
            .field("block_count", &self.params.block_count)
            .finish_non_exhaustive()
    }
}

/// Ciphertext: the `n0` blocks of a codeword plus error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    params: &'static ParameterSet,
    blocks: Vec<DensePoly>,
}

impl Ciphertext {
    /// Parameter set this ciphertext belongs to.
    pub fn params(&self) -> &'static ParameterSet {
        self.params
    }

    /// Serialize: `n0 * p` bits, highest coefficient of each block first, then the end marker.
    pub fn to_bytes(&self) -> Vec<u8> {
        pack_blocks(&self.blocks)
    }

    /// Parse a ciphertext, checking its length and end marker.
    pub fn from_bytes(params: &'static ParameterSet, bytes: &[u8]) -> Result<Self> {
        let blocks = unpack_blocks(bytes, params.block_count, params.block_size, "ciphertext")?;
        Ok(Self { params, blocks })
    }
}

/// LEDA public-key encryption
pub struct LedaPke;

impl LedaPke {
    /// Generate a key pair, drawing the private seed from `rng`.
    pub fn keygen<R: RngCore + CryptoRng>(
        params: &'static ParameterSet,
        rng: &mut R,
    ) -> (PrivateKey, PublicKey) {
        let mut seed = vec![0u8; params.seed_len];
        rng.fill_bytes(&mut seed);
        let sk = PrivateKey { params, seed };
        let pk = Self::public_key(&sk);
        (sk, pk)
    }

    /// Generate the key pair determined by `seed`.
    pub fn keygen_from_seed(
        params: &'static ParameterSet,
        seed: &[u8],
    ) -> Result<(PrivateKey, PublicKey)> {
        let sk = PrivateKey::from_bytes(params, seed)?;
        let pk = Self::public_key(&sk);
        Ok((sk, pk))
    }

    fn public_key(sk: &PrivateKey) -> PublicKey {
        let params = sk.params;
        let matrices = PrivateMatrices::expand(params, &sk.seed);
        debug!(
            "generated key pair: category {}, {} blocks of {} bits",
            params.category, params.block_count, params.block_size
        );
        PublicKey {
            params,
            blocks: matrices.public_blocks(params),
        }
    }

    /// Encrypt `msg` under `pk`.
    ///
    /// Fails with [`Error::PlaintextTooLarge`] before drawing any randomness
    /// when `msg` exceeds [`ParameterSet::max_plaintext_bits`].
    pub fn encrypt<R: RngCore + CryptoRng>(
        pk: &PublicKey,
        msg: &[u8],
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let params = pk.params;
        let bits = msg.len() * 8;
        let max = params.max_plaintext_bits();
        if bits > max {
            return Err(Error::PlaintextTooLarge { bits, max });
        }

        let mut seed = Zeroizing::new(vec![0u8; params.seed_len]);
        for attempt in 1..=MAX_ENCODING_ATTEMPTS {
            rng.fill_bytes(&mut seed);
            if let Some(ct) = encrypt_with_seed(pk, msg, &seed) {
                return Ok(ct);
            }
            debug!("constant-weight encoding failed, attempt {attempt} of {MAX_ENCODING_ATTEMPTS}");
        }
        Err(Error::EncodingExhausted {
            attempts: MAX_ENCODING_ATTEMPTS,
        })
    }

    /// Decrypt `ct` with `sk`.
    ///
    /// Either returns the exact plaintext or an error; nothing partial.
    pub fn decrypt(sk: &PrivateKey, ct: &Ciphertext) -> Result<Vec<u8>> {
        let params = sk.params;
        if ct.params != params {
            return Err(Error::InvalidLength {
                what: "ciphertext",
                expected: padded_len(params.n()),
                actual: padded_len(ct.params.n()),
            });
        }
        let p = params.block_size;
        let digest_len = params.digest_len();
        let seed_len = params.seed_len;
        let cw_bits = params.cw_payload_bits();

        let matrices = PrivateMatrices::expand(params, &sk.seed);
        let mut syndrome = DensePoly::zero(p);
        for (block, row) in ct.blocks.iter().zip(matrices.l.iter()) {
            syndrome += &block.transpose().mul_sparse(row);
        }
        let error = BitFlipping::decode(params, &matrices, syndrome.transpose())?;

        let mut y = Zeroizing::new(vec![0u8; params.buffer_bits() / 8]);
        ConstantWeight::decode(params, &error, &mut y, cw_bits)?;
        let info_blocks = ct.blocks.iter().zip(error.iter()).take(params.block_count - 1);
        for (i, (block, e)) in info_blocks.enumerate() {
            let mut info = block.clone();
            info += e;
            for k in info.ones() {
                set_bit(&mut y, cw_bits + i * p + k);
            }
        }

        let digest = Zeroizing::new(params.hash.digest(&y[digest_len..]));
        if !bool::from(y[seed_len..digest_len].ct_eq(&digest[seed_len..])) {
            return Err(Error::DigestMismatch);
        }

        let seed: Zeroizing<Vec<u8>> = Zeroizing::new(
            y[..seed_len]
                .iter()
                .zip(digest.iter())
                .map(|(a, b)| a ^ b)
                .collect(),
        );
        xor_mask(&seed, &mut y[digest_len..]);

        let plaintext = &mut y[digest_len..];
        let last = plaintext.len() * 8 - 1;
        if !get_bit(plaintext, last) {
            return Err(Error::MalformedPadding);
        }
        clear_bit(plaintext, last);
        let marker = last_set_bit(plaintext).ok_or(Error::MalformedPadding)?;
        if marker % 8 != 0 {
            return Err(Error::MalformedPadding);
        }
        Ok(plaintext[..marker / 8].to_vec())
    }
}

/// One encryption attempt with a fixed seed.
///
/// `None` when the head of the working buffer cannot be carried by a
/// constant-weight error vector.
fn encrypt_with_seed(pk: &PublicKey, msg: &[u8], seed: &[u8]) -> Option<Ciphertext> {
    let params = pk.params;
    let digest_len = params.digest_len();

    let mut y = Zeroizing::new(vec![0u8; params.buffer_bits() / 8]);
    y[digest_len..digest_len + msg.len()].copy_from_slice(msg);
    set_bit(&mut y, 8 * (digest_len + msg.len()));
    let last = y.len() * 8 - 1;
    set_bit(&mut y, last);
    seal(pk, y, seed)
}

/// Mask the padded buffer `y`, bind it to `seed` and encode it.
fn seal(pk: &PublicKey, mut y: Zeroizing<Vec<u8>>, seed: &[u8]) -> Option<Ciphertext> {
    let params = pk.params;
    let p = params.block_size;
    let digest_len = params.digest_len();
    let cw_bits = params.cw_payload_bits();

    xor_mask(seed, &mut y[digest_len..]);
    let digest = Zeroizing::new(params.hash.digest(&y[digest_len..]));
    y[..digest_len].copy_from_slice(&digest);
    for (b, s) in y.iter_mut().zip(seed.iter()) {
        *b ^= *s;
    }

    let error = ConstantWeight::encode(params, &y, cw_bits)?;

    let mut blocks = Vec::with_capacity(params.block_count);
    let mut redundancy = DensePoly::zero(p);
    for (i, (pk_block, e)) in pk.blocks.iter().zip(error.iter()).enumerate() {
        let mut info = DensePoly::zero(p);
        let offset = cw_bits + i * p;
        for k in 0..p {
            if get_bit(&y, offset + k) {
                info.flip(k);
            }
        }
        redundancy += &pk_block.mul(&info);
        info += e;
        blocks.push(info);
    }
    redundancy += &error[params.block_count - 1];
    blocks.push(redundancy);

    Some(Ciphertext { params, blocks })
}
