//! Paillier encryption with `g = n + 1`.

use super::{AdditiveCipher, KeyPair};
use crate::error::{PsiSumError, Result};
use num_bigint_dig::{BigUint, ModInverse, RandBigInt, RandPrime, ToBigUint};
use num_traits::{One, ToPrimitive, Zero};
use rand::{CryptoRng, RngCore};

/// Default bit length of the Paillier modulus `n`.
pub const DEFAULT_MODULUS_BITS: usize = 1024;

/// Smallest modulus accepted; leaves room for sums of many `u64` values.
pub const MIN_MODULUS_BITS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaillierPublicKey {
    n: BigUint,
    n_squared: BigUint,
}

impl PaillierPublicKey {
    fn new(n: BigUint) -> Self {
        let n_squared = &n * &n;
        Self { n, n_squared }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }
}

pub struct PaillierSecretKey {
    phi: BigUint,
    mu: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaillierCiphertext(BigUint);

impl PaillierCiphertext {
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

/// Paillier key generation parameters.
#[derive(Debug, Clone, Copy)]
pub struct PaillierCipher {
    modulus_bits: usize,
}

impl PaillierCipher {
    pub fn new(modulus_bits: usize) -> Self {
        Self { modulus_bits }
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }
}

impl Default for PaillierCipher {
    fn default() -> Self {
        Self::new(DEFAULT_MODULUS_BITS)
    }
}

impl AdditiveCipher for PaillierCipher {
    type PublicKey = PaillierPublicKey;
    type SecretKey = PaillierSecretKey;
    type Ciphertext = PaillierCiphertext;

    fn generate_keypair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair<Self>> {
        if self.modulus_bits < MIN_MODULUS_BITS {
            return Err(PsiSumError::Cipher(format!(
                "Paillier modulus of {} bits is below the minimum of {}",
                self.modulus_bits, MIN_MODULUS_BITS
            )));
        }

        let prime_bits = self.modulus_bits / 2;
        let (p, q) = loop {
            let p = rng.gen_prime(prime_bits);
            let q = rng.gen_prime(prime_bits);
            if p != q {
                break (p, q);
            }
        };

        let n = &p * &q;
        let phi = (p - BigUint::one()) * (q - BigUint::one());
        let mu = phi
            .clone()
            .mod_inverse(&n)
            .and_then(|inverse| inverse.to_biguint())
            .ok_or_else(|| PsiSumError::Cipher("phi(n) is not invertible modulo n".to_string()))?;

        Ok(KeyPair {
            public_key: PaillierPublicKey::new(n),
            secret_key: PaillierSecretKey { phi, mu },
        })
    }

    fn encrypt<R: RngCore + CryptoRng>(
        public_key: &PaillierPublicKey,
        plaintext: u64,
        rng: &mut R,
    ) -> PaillierCiphertext {
        let n = &public_key.n;
        let n_squared = &public_key.n_squared;
        // (n + 1)^m = 1 + m*n (mod n^2)
        let g_m = (BigUint::one() + BigUint::from(plaintext) * n) % n_squared;
        let r = rng.gen_biguint_range(&BigUint::one(), n);
        PaillierCiphertext((g_m * r.modpow(n, n_squared)) % n_squared)
    }

    fn decrypt(
        public_key: &PaillierPublicKey,
        secret_key: &PaillierSecretKey,
        ciphertext: &PaillierCiphertext,
    ) -> Result<u64> {
        let n = &public_key.n;
        if ciphertext.0.is_zero() || ciphertext.0 >= public_key.n_squared {
            return Err(PsiSumError::Cipher(
                "ciphertext is outside (0, n^2)".to_string(),
            ));
        }
        let x = ciphertext.0.modpow(&secret_key.phi, &public_key.n_squared);
        if x.is_zero() {
            return Err(PsiSumError::Cipher(
                "ciphertext shares a factor with n".to_string(),
            ));
        }
        let l = (x - BigUint::one()) / n;
        let plaintext = (l * &secret_key.mu) % n;
        plaintext.to_u64().ok_or_else(|| {
            PsiSumError::Cipher(format!("decrypted value {} does not fit in u64", plaintext))
        })
    }

    fn add(
        public_key: &PaillierPublicKey,
        lhs: &PaillierCiphertext,
        rhs: &PaillierCiphertext,
    ) -> PaillierCiphertext {
        PaillierCiphertext((&lhs.0 * &rhs.0) % &public_key.n_squared)
    }
}
