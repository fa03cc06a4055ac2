//! End-to-end key generation, encryption and decryption.

use ledars::{Ciphertext, Error, LedaPke, ParameterSet, PrivateKey, PublicKey, parameter_sets};
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;

fn rng(seed: u8) -> ChaCha20Rng {
    ChaCha20Rng::from_seed([seed; 32])
}

/// Byte length of `bits` payload bits followed by the end marker
fn padded_len(bits: usize) -> usize {
    (bits + (8 - bits % 8) % 8 + 8) / 8
}

#[test]
fn round_trip_all_parameter_sets() {
    let mut rng = rng(1);
    for params in parameter_sets() {
        let (sk, pk) = LedaPke::keygen(params, &mut rng);
        let msg = format!("category {} with {} blocks", params.category, params.block_count);
        let ct = LedaPke::encrypt(&pk, msg.as_bytes(), &mut rng).unwrap();
        assert_eq!(LedaPke::decrypt(&sk, &ct).unwrap(), msg.as_bytes(), "{params:?}");
    }
}

#[test]
fn category_4_four_blocks_example() {
    let params = ParameterSet::get(4, 4).unwrap();
    let msg = "AAAABBBBCCCCDDDD 1111222233334444".as_bytes();
    let mut rng = rng(2);

    let (sk, pk) = LedaPke::keygen(params, &mut rng);
    let ct = LedaPke::encrypt(&pk, msg, &mut rng).unwrap();
    let pt = LedaPke::decrypt(&sk, &ct).unwrap();
    assert_eq!(pt, msg);
}

#[test]
fn serialized_keys_and_ciphertexts_round_trip() {
    let params = ParameterSet::get(1, 3).unwrap();
    let mut rng = rng(3);
    let (sk, pk) = LedaPke::keygen(params, &mut rng);

    let pk_bytes = pk.to_bytes();
    assert_eq!(pk_bytes.len(), padded_len(params.k()));
    assert_eq!(pk_bytes.last().map(|b| b & 1), Some(1));
    let pk = PublicKey::from_bytes(params, &pk_bytes).unwrap();

    let sk_bytes = sk.to_bytes();
    assert_eq!(sk_bytes.len(), params.seed_len);
    let sk = PrivateKey::from_bytes(params, &sk_bytes).unwrap();

    let ct = LedaPke::encrypt(&pk, b"over the wire", &mut rng).unwrap();
    let ct_bytes = ct.to_bytes();
    assert_eq!(ct_bytes.len(), padded_len(params.n()));
    let ct = Ciphertext::from_bytes(params, &ct_bytes).unwrap();

    assert_eq!(LedaPke::decrypt(&sk, &ct).unwrap(), b"over the wire");
}

#[test]
fn keygen_from_seed_is_deterministic() {
    let params = ParameterSet::get(2, 4).unwrap();
    let seed = [0x24u8; 32];
    let (sk1, pk1) = LedaPke::keygen_from_seed(params, &seed).unwrap();
    let (sk2, pk2) = LedaPke::keygen_from_seed(params, &seed).unwrap();
    assert_eq!(sk1, sk2);
    assert_eq!(pk1.to_bytes(), pk2.to_bytes());
    assert_eq!(sk1.as_bytes(), seed);

    assert_eq!(
        LedaPke::keygen_from_seed(params, &seed[..24]).err(),
        Some(Error::InvalidLength {
            what: "private key",
            expected: 32,
            actual: 24
        })
    );
}

#[test]
fn oversized_plaintext_is_rejected() {
    let params = ParameterSet::get(1, 2).unwrap();
    let mut rng = rng(4);
    let (_, pk) = LedaPke::keygen(params, &mut rng);

    let max = params.max_plaintext_bits();
    let msg = vec![0u8; max / 8 + 1];
    assert_eq!(
        LedaPke::encrypt(&pk, &msg, &mut rng),
        Err(Error::PlaintextTooLarge {
            bits: msg.len() * 8,
            max
        })
    );
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let params = ParameterSet::get(1, 2).unwrap();
    let mut rng = rng(5);
    let (sk, pk) = LedaPke::keygen(params, &mut rng);
    let ct = LedaPke::encrypt(&pk, b"do not touch", &mut rng).unwrap();
    let bytes = ct.to_bytes();

    for bit in [0, 7, 8 * 1000 + 3, params.n() - 1] {
        let mut tampered = bytes.clone();
        tampered[bit / 8] ^= 0x80 >> (bit % 8);
        let ct = Ciphertext::from_bytes(params, &tampered).unwrap();
        assert!(LedaPke::decrypt(&sk, &ct).is_err(), "bit {bit}");
    }
}

#[test]
fn wrong_private_key_is_rejected() {
    let params = ParameterSet::get(1, 2).unwrap();
    let mut rng = rng(6);
    let (_, pk) = LedaPke::keygen(params, &mut rng);
    let (other_sk, _) = LedaPke::keygen(params, &mut rng);
    let ct = LedaPke::encrypt(&pk, b"for someone else", &mut rng).unwrap();
    assert!(LedaPke::decrypt(&other_sk, &ct).is_err());
}

#[test]
fn malformed_encodings_are_rejected() {
    let params = ParameterSet::get(1, 2).unwrap();
    let (_, pk) = LedaPke::keygen_from_seed(params, &[7u8; 24]).unwrap();
    let bytes = pk.to_bytes();

    assert!(matches!(
        PublicKey::from_bytes(params, &bytes[..bytes.len() - 1]),
        Err(Error::InvalidLength { what: "public key", .. })
    ));

    let mut no_marker = bytes.clone();
    *no_marker.last_mut().unwrap() &= 0xfe;
    assert_eq!(
        PublicKey::from_bytes(params, &no_marker),
        Err(Error::MalformedPadding)
    );

    assert!(matches!(
        Ciphertext::from_bytes(params, &bytes),
        Err(Error::InvalidLength { what: "ciphertext", .. })
    ));
}
