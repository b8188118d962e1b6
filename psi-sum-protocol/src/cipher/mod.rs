//! Additive-homomorphic encryption used to aggregate Party 2's values.
//!
//! The protocol only talks to [`AdditiveCipher`], so the toy scheme from the
//! reference scenario and a Paillier instance are interchangeable.

use crate::error::Result;
use rand::{CryptoRng, RngCore};
use std::fmt;

pub mod paillier;
pub mod toy;

pub use paillier::PaillierCipher;
pub use toy::ToyCipher;

/// An encryption scheme with `Dec(add(Enc(a), Enc(b))) == a + b`.
pub trait AdditiveCipher {
    type PublicKey: Clone + fmt::Debug + PartialEq + Send + Sync;
    type SecretKey;
    type Ciphertext: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Generate a fresh key pair.
    fn generate_keypair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair<Self>>;

    /// Encrypt `plaintext`, drawing fresh randomness from `rng`.
    fn encrypt<R: RngCore + CryptoRng>(
        public_key: &Self::PublicKey,
        plaintext: u64,
        rng: &mut R,
    ) -> Self::Ciphertext;

    /// Decrypt a ciphertext. Only the key pair owner can call this.
    fn decrypt(
        public_key: &Self::PublicKey,
        secret_key: &Self::SecretKey,
        ciphertext: &Self::Ciphertext,
    ) -> Result<u64>;

    /// Homomorphic addition of two ciphertexts under the same key.
    fn add(
        public_key: &Self::PublicKey,
        lhs: &Self::Ciphertext,
        rhs: &Self::Ciphertext,
    ) -> Self::Ciphertext;
}

/// A public/secret key pair owned by Party 2.
pub struct KeyPair<C: AdditiveCipher + ?Sized> {
    pub public_key: C::PublicKey,
    pub secret_key: C::SecretKey,
}

impl<C: AdditiveCipher + ?Sized> fmt::Debug for KeyPair<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
