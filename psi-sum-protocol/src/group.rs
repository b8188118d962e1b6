//! Group arithmetic for the blinding layer.
//!
//! Identifiers are hashed into `Z_p` and blinded by raising them to private
//! exponents. Blinding commutes, `(H(x)^k1)^k2 == (H(x)^k2)^k1 mod p`, which is
//! what lets both parties compare identifiers without revealing them.

use crate::error::{PsiSumError, Result};
use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fmt;

/// Miller-Rabin rounds used when validating a modulus.
const PRIMALITY_ROUNDS: usize = 20;

/// RFC 3526 group 14 (2048-bit MODP) prime.
const MODP_2048_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// The prime modulus shared by both parties for one protocol run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupParameters {
    modulus: BigUint,
}

impl GroupParameters {
    /// Create group parameters from a prime modulus.
    ///
    /// # Errors
    /// Returns `PsiSumError::InvalidModulus` if `modulus` is not a prime
    /// greater than 2.
    pub fn new(modulus: BigUint) -> Result<Self> {
        if modulus <= BigUint::from(2u8) {
            return Err(PsiSumError::InvalidModulus(format!(
                "{} must be greater than 2",
                modulus
            )));
        }
        if !probably_prime(&modulus, PRIMALITY_ROUNDS) {
            return Err(PsiSumError::InvalidModulus(format!(
                "{} is not prime",
                modulus
            )));
        }
        Ok(Self { modulus })
    }

    /// Create group parameters from a machine-word modulus.
    pub fn from_u64(modulus: u64) -> Result<Self> {
        Self::new(BigUint::from(modulus))
    }

    /// The Mersenne prime `2^31 - 1`.
    ///
    /// Small enough to read in traces, far too small for real use.
    pub fn mersenne_31() -> Self {
        Self {
            modulus: BigUint::from(2_147_483_647u64),
        }
    }

    /// The 2048-bit MODP prime from RFC 3526.
    pub fn modp_2048() -> Self {
        let modulus = BigUint::parse_bytes(MODP_2048_HEX.as_bytes(), 16)
            .expect("RFC 3526 prime is valid hex");
        Self { modulus }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns true if `value` is a reduced residue, i.e. `value < p`.
    pub(crate) fn contains(&self, value: &BigUint) -> bool {
        value < &self.modulus
    }
}

/// A private blinding exponent in `[1, p - 2]`.
///
/// Deliberately not `Clone`; it never leaves the party that sampled it.
pub struct PrivateExponent(BigUint);

impl PrivateExponent {
    #[cfg(test)]
    pub(crate) fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateExponent(<redacted>)")
    }
}

/// A hashed identifier raised to one or more private exponents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlindedValue(BigUint);

impl BlindedValue {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Display for BlindedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash an identifier into `Z_p`.
///
/// SHA-256 of the UTF-8 bytes, read big-endian, reduced modulo `p`.
pub fn hash_to_group(identifier: &str, params: &GroupParameters) -> BigUint {
    let digest = Sha256::digest(identifier.as_bytes());
    BigUint::from_bytes_be(&digest) % params.modulus()
}

/// Compute `base^exponent mod modulus`.
pub fn mod_exp(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exponent, modulus)
}

/// Sample a fresh private exponent uniformly from `[1, p - 2]`.
pub fn generate_private_exponent<R: RngCore + CryptoRng>(
    params: &GroupParameters,
    rng: &mut R,
) -> PrivateExponent {
    let upper = params.modulus() - BigUint::one();
    PrivateExponent(rng.gen_biguint_range(&BigUint::one(), &upper))
}

/// Sample a fresh private exponent using `OsRng`.
pub fn random_exponent(params: &GroupParameters) -> PrivateExponent {
    generate_private_exponent(params, &mut OsRng)
}

/// Hash an identifier and blind it with `exponent`.
pub fn blind_identifier(
    identifier: &str,
    exponent: &PrivateExponent,
    params: &GroupParameters,
) -> BlindedValue {
    let hashed = hash_to_group(identifier, params);
    BlindedValue(mod_exp(&hashed, &exponent.0, params.modulus()))
}

/// Raise an already blinded value to another exponent.
pub fn reblind(
    value: &BlindedValue,
    exponent: &PrivateExponent,
    params: &GroupParameters,
) -> BlindedValue {
    BlindedValue(mod_exp(&value.0, &exponent.0, params.modulus()))
}

/// Hash and blind a batch of identifiers in parallel.
///
/// The output order matches the input order.
pub fn blind_identifiers<S: AsRef<str> + Sync>(
    identifiers: &[S],
    exponent: &PrivateExponent,
    params: &GroupParameters,
) -> Vec<BlindedValue> {
    identifiers
        .par_iter()
        .map(|identifier| blind_identifier(identifier.as_ref(), exponent, params))
        .collect()
}

/// Re-blind a batch of values in parallel.
///
/// The output order matches the input order.
pub fn reblind_all(
    values: &[BlindedValue],
    exponent: &PrivateExponent,
    params: &GroupParameters,
) -> Vec<BlindedValue> {
    values
        .par_iter()
        .map(|value| reblind(value, exponent, params))
        .collect()
}

/// Check that every element of a received list is a residue modulo `p`.
pub(crate) fn validate_elements<'a, I>(values: I, params: &GroupParameters, what: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a BlindedValue>,
{
    match values
        .into_iter()
        .position(|value| !params.contains(value.value()))
    {
        Some(index) => Err(PsiSumError::InvalidMessage(format!(
            "{} element {} is not reduced modulo p",
            what, index
        ))),
        None => Ok(()),
    }
}
