//! The toy additive scheme the reference scenario composes with.
//!
//! `Enc(m) = (m * pk + noise) mod 10^12` and `Dec(c) = floor(c / pk) mod 10^8`.
//! Decryption is exact while `noise < pk` and every running sum stays below
//! `10^12`. Overflow wraps silently. This is NOT semantically secure; use
//! [`PaillierCipher`](super::PaillierCipher) for anything real.

use super::{AdditiveCipher, KeyPair};
use crate::error::Result;
use rand::{CryptoRng, Rng, RngCore};
use std::ops::RangeInclusive;

/// Ciphertext modulus.
pub const CIPHERTEXT_MODULUS: u64 = 1_000_000_000_000;

/// Plaintext modulus applied on decryption.
pub const PLAINTEXT_MODULUS: u64 = 100_000_000;

const SECRET_KEY_RANGE: RangeInclusive<u64> = 100_000..=1_000_000;
const NOISE_RANGE: RangeInclusive<u64> = 1..=50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToyPublicKey(u64);

impl ToyPublicKey {
    pub fn value(&self) -> u64 {
        self.0
    }
}

pub struct ToySecretKey(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToyCiphertext(u64);

impl ToyCiphertext {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// The toy scheme. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToyCipher;

impl AdditiveCipher for ToyCipher {
    type PublicKey = ToyPublicKey;
    type SecretKey = ToySecretKey;
    type Ciphertext = ToyCiphertext;

    fn generate_keypair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair<Self>> {
        let sk = rng.gen_range(SECRET_KEY_RANGE);
        Ok(KeyPair {
            public_key: ToyPublicKey(3 * sk + 1),
            secret_key: ToySecretKey(sk),
        })
    }

    fn encrypt<R: RngCore + CryptoRng>(
        public_key: &ToyPublicKey,
        plaintext: u64,
        rng: &mut R,
    ) -> ToyCiphertext {
        let noise = rng.gen_range(NOISE_RANGE);
        let scaled = u128::from(plaintext) * u128::from(public_key.0) + u128::from(noise);
        ToyCiphertext((scaled % u128::from(CIPHERTEXT_MODULUS)) as u64)
    }

    // The secret key plays no part in decryption; the scheme hides nothing
    // from anyone holding pk.
    fn decrypt(
        public_key: &ToyPublicKey,
        _secret_key: &ToySecretKey,
        ciphertext: &ToyCiphertext,
    ) -> Result<u64> {
        Ok((ciphertext.0 / public_key.0) % PLAINTEXT_MODULUS)
    }

    fn add(_public_key: &ToyPublicKey, lhs: &ToyCiphertext, rhs: &ToyCiphertext) -> ToyCiphertext {
        ToyCiphertext((lhs.0 + rhs.0) % CIPHERTEXT_MODULUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::OsRng;

    fn keypair() -> KeyPair<ToyCipher> {
        ToyCipher.generate_keypair(&mut OsRng).unwrap()
    }

    #[test]
    fn test_keypair_shape() {
        for _ in 0..100 {
            let kp = keypair();
            assert!(SECRET_KEY_RANGE.contains(&kp.secret_key.0));
            assert_eq!(kp.public_key.value(), 3 * kp.secret_key.0 + 1);
        }
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let kp = keypair();
        let ciphertexts: Vec<_> = (0..32)
            .map(|_| ToyCipher::encrypt(&kp.public_key, 42, &mut OsRng))
            .collect();
        assert!(ciphertexts.iter().any(|c| *c != ciphertexts[0]));
    }

    #[test]
    fn test_encrypt_zero_decrypts_to_zero() {
        let kp = keypair();
        let c = ToyCipher::encrypt(&kp.public_key, 0, &mut OsRng);
        assert!(c.value() <= 50);
        assert_eq!(ToyCipher::decrypt(&kp.public_key, &kp.secret_key, &c), Ok(0));
    }

    #[test]
    fn test_overflow_wraps_silently() {
        let kp = keypair();
        // m * pk exceeds the ciphertext modulus for any pk >= 300_001.
        let m = CIPHERTEXT_MODULUS / 300_001 + 1;
        let c = ToyCipher::encrypt(&kp.public_key, m, &mut OsRng);
        let decrypted = ToyCipher::decrypt(&kp.public_key, &kp.secret_key, &c).unwrap();
        assert_ne!(decrypted, m);
    }

    proptest! {
        #[test]
        fn round_trip(m in 0u64..300_000) {
            let kp = keypair();
            let c = ToyCipher::encrypt(&kp.public_key, m, &mut OsRng);
            prop_assert_eq!(ToyCipher::decrypt(&kp.public_key, &kp.secret_key, &c).unwrap(), m);
        }

        #[test]
        fn addition_is_homomorphic(m1 in 0u64..150_000, m2 in 0u64..150_000) {
            let kp = keypair();
            let c1 = ToyCipher::encrypt(&kp.public_key, m1, &mut OsRng);
            let c2 = ToyCipher::encrypt(&kp.public_key, m2, &mut OsRng);
            let sum = ToyCipher::add(&kp.public_key, &c1, &c2);
            prop_assert_eq!(
                ToyCipher::decrypt(&kp.public_key, &kp.secret_key, &sum).unwrap(),
                (m1 + m2) % PLAINTEXT_MODULUS
            );
        }
    }
}
