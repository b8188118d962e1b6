//! Message types exchanged between the two parties.
//!
//! All lists are shuffled by their sender; position carries no information.

use crate::error::{PsiSumError, Result};
use crate::group::BlindedValue;

/// Round 1, Party 1 → Party 2: `H(v)^k1` for every identifier in V.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round1Message {
    pub blinded: Vec<BlindedValue>,
}

impl Round1Message {
    pub fn new(blinded: Vec<BlindedValue>) -> Self {
        Self { blinded }
    }

    /// Returns the number of blinded identifiers in this message.
    pub fn len(&self) -> usize {
        self.blinded.len()
    }

    /// Returns true if Party 1's set was empty.
    pub fn is_empty(&self) -> bool {
        self.blinded.is_empty()
    }
}

/// One of Party 2's identifiers, blinded once, with its encrypted value.
///
/// The pair is shuffled as a unit so the association survives.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncryptedEntry<T> {
    /// `H(w)^k2`
    pub blinded: BlindedValue,
    /// `Enc(t)`
    pub ciphertext: T,
}

/// Round 2, Party 2 → Party 1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round2Message<P, T> {
    /// `(H(v)^k1)^k2` for every element of the round 1 message.
    pub double_blinded: Vec<BlindedValue>,
    /// Party 2's weighted set, blinded and encrypted.
    pub entries: Vec<EncryptedEntry<T>>,
    /// Key the aggregate is computed under.
    pub public_key: P,
}

impl<P, T> Round2Message<P, T> {
    pub fn new(
        double_blinded: Vec<BlindedValue>,
        entries: Vec<EncryptedEntry<T>>,
        public_key: P,
    ) -> Self {
        Self {
            double_blinded,
            entries,
            public_key,
        }
    }

    /// Returns the number of encrypted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get just the blinded identifiers (without ciphertexts).
    pub fn blinded_entries(&self) -> Vec<BlindedValue> {
        self.entries
            .iter()
            .map(|entry| entry.blinded.clone())
            .collect()
    }
}

/// Round 3, Party 1 → Party 2: the encrypted intersection-sum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round3Message<T> {
    pub aggregate: T,
}

/// What Party 1 holds after round 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round3Output<T> {
    /// Message to send back to Party 2.
    pub message: Round3Message<T>,
    /// Positions in the round 2 entry list whose identifier matched.
    pub matched_indices: Vec<usize>,
}

impl<T> Round3Output<T> {
    /// Returns the number of matched entries.
    pub fn intersection_size(&self) -> usize {
        self.matched_indices.len()
    }
}

/// Final result of an orchestrated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionSumResult {
    /// The decrypted sum, learned by Party 2.
    pub sum: u64,
    /// Number of matches, learned by Party 1.
    pub intersection_size: usize,
}

/// Reject sets that name the same identifier twice.
pub(crate) fn ensure_unique<'a, I>(identifiers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    for identifier in identifiers {
        if !seen.insert(identifier) {
            return Err(PsiSumError::DuplicateIdentifier(identifier.to_string()));
        }
    }
    Ok(())
}
