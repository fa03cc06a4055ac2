#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//!
//! # Security Warning
//!
//! **DO NOT USE THIS LIBRARY IN PRODUCTION.**
//!
//! This is an educational implementation for learning and experimentation.
//! It has not been audited, the decoder has secret-dependent timing, and it
//! provides no security guarantees.
//!
//! # Usage
//!
//! ```
//! use ledars::{LedaPke, ParameterSet};
//! use rand_chacha::ChaCha20Rng;
//! use rand_chacha::rand_core::SeedableRng;
//!
//! // Obviously don't do this irl
//! let mut rng = ChaCha20Rng::from_seed([0x42u8; 32]);
//!
//! let params = ParameterSet::get(1, 2).unwrap();
//! let (sk, pk) = LedaPke::keygen(params, &mut rng);
//! let ct = LedaPke::encrypt(&pk, b"attack at dawn", &mut rng).unwrap();
//! let pt = LedaPke::decrypt(&sk, &ct).unwrap();
//! assert_eq!(pt, b"attack at dawn");
//! ```

extern crate alloc;

#[cfg(test)]
mod test_util;

/// Seeded SHAKE256 streams
mod xof;

/// Wire packing and end markers
mod pack;

/// Error type
mod error;

/// Parameter sets
mod param;

/// Circulant arithmetic over GF(2)
pub mod gf2x;

/// Constant-weight codec
pub mod cw;

/// Private matrices
pub mod keygen;

/// Bit-flipping decoder
pub mod decoder;

/// Key generation, encryption and decryption
pub mod pke;

#[cfg(test)]
extern crate std;

pub use error::{Error, Result};
pub use param::{CATEGORY_1, CATEGORY_3, CATEGORY_5, HashFunction, ParameterSet};
pub use pke::{Ciphertext, LedaPke, PrivateKey, PublicKey};

#[cfg(feature = "getrandom")]
pub use rand_core::OsRng;

/// Every registered parameter set
pub fn parameter_sets() -> impl Iterator<Item = &'static ParameterSet> {
    param::all()
}
