//! Per-party protocol state (type-state pattern).
//!
//! Each round consumes the state it runs from and returns the next one, so
//! rounds cannot be replayed or run out of order.

use crate::cipher::{AdditiveCipher, KeyPair};
use crate::error::Result;
use crate::group::{random_exponent, BlindedValue, GroupParameters, PrivateExponent};
use crate::messages::ensure_unique;
use rand::rngs::OsRng;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Party 1 before round 1: holds the identifier set V and exponent k1.
#[derive(Debug)]
pub struct Party1<C> {
    pub(crate) params: GroupParameters,
    pub(crate) identifiers: Vec<String>,
    /// k1
    pub(crate) exponent: PrivateExponent,
    pub(crate) _cipher: PhantomData<C>,
}

impl<C: AdditiveCipher> Party1<C> {
    /// Create Party 1 with a fresh random exponent.
    ///
    /// # Errors
    /// Returns `PsiSumError::DuplicateIdentifier` if an identifier repeats.
    pub fn new<S: AsRef<str>>(identifiers: &[S], params: GroupParameters) -> Result<Self> {
        ensure_unique(identifiers.iter().map(|s| s.as_ref()))?;
        Ok(Self {
            exponent: random_exponent(&params),
            identifiers: identifiers.iter().map(|s| s.as_ref().to_string()).collect(),
            params,
            _cipher: PhantomData,
        })
    }

    pub fn params(&self) -> &GroupParameters {
        &self.params
    }
}

/// Party 1 after sending round 1, waiting for Party 2's reply.
#[derive(Debug)]
pub struct Party1AwaitingRound2<C> {
    pub(crate) params: GroupParameters,
    pub(crate) exponent: PrivateExponent,
    /// H1 = { H(v)^k1 : v in V }
    pub(crate) blinded_set: HashSet<BlindedValue>,
    /// Number of values sent in round 1. Can exceed `blinded_set.len()`
    /// when two identifiers blind to the same value.
    pub(crate) sent: usize,
    pub(crate) _cipher: PhantomData<C>,
}

impl<C> Party1AwaitingRound2<C> {
    /// Get the singly-blinded set (for testing purposes).
    #[cfg(test)]
    pub fn blinded_set(&self) -> &HashSet<BlindedValue> {
        &self.blinded_set
    }
}

/// Party 2 before round 2: holds W, exponent k2 and the cipher key pair.
#[derive(Debug)]
pub struct Party2<C: AdditiveCipher> {
    pub(crate) params: GroupParameters,
    pub(crate) entries: Vec<(String, u64)>,
    /// k2
    pub(crate) exponent: PrivateExponent,
    pub(crate) keypair: KeyPair<C>,
}

impl<C: AdditiveCipher> Party2<C> {
    /// Create Party 2 with a fresh random exponent and key pair.
    ///
    /// # Errors
    /// Returns `PsiSumError::DuplicateIdentifier` if an identifier repeats,
    /// or `PsiSumError::Cipher` if key generation fails.
    pub fn new<S: AsRef<str>>(
        entries: &[(S, u64)],
        params: GroupParameters,
        cipher: &C,
    ) -> Result<Self> {
        ensure_unique(entries.iter().map(|(identifier, _)| identifier.as_ref()))?;
        Ok(Self {
            exponent: random_exponent(&params),
            keypair: cipher.generate_keypair(&mut OsRng)?,
            entries: entries
                .iter()
                .map(|(identifier, value)| (identifier.as_ref().to_string(), *value))
                .collect(),
            params,
        })
    }

    pub fn public_key(&self) -> &C::PublicKey {
        &self.keypair.public_key
    }
}

/// Party 2 after sending round 2; only the key pair is kept.
#[derive(Debug)]
pub struct Party2AwaitingRound3<C: AdditiveCipher> {
    pub(crate) keypair: KeyPair<C>,
}
