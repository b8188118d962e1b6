//! Party 1: the identifier-only side. Runs rounds 1 and 3.

use crate::cipher::AdditiveCipher;
use crate::error::{PsiSumError, Result};
use crate::group::{blind_identifiers, reblind, validate_elements, BlindedValue};
use crate::messages::{Round1Message, Round2Message, Round3Message, Round3Output};
use crate::state::{Party1, Party1AwaitingRound2};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::{debug, info, instrument};

impl<C: AdditiveCipher> Party1<C> {
    /// Round 1: blind every identifier with k1 and shuffle.
    ///
    /// Consumes the identifier set; only the blinded set H1 is kept.
    #[instrument(skip_all, fields(identifiers = self.identifiers.len()))]
    pub fn round1(self) -> (Party1AwaitingRound2<C>, Round1Message) {
        let mut blinded = blind_identifiers(&self.identifiers, &self.exponent, &self.params);
        let blinded_set: HashSet<BlindedValue> = blinded.iter().cloned().collect();
        blinded.shuffle(&mut OsRng);

        info!(sent = blinded.len(), "Party 1 round 1 complete");

        let next = Party1AwaitingRound2 {
            params: self.params,
            exponent: self.exponent,
            blinded_set,
            sent: blinded.len(),
            _cipher: PhantomData,
        };
        (next, Round1Message::new(blinded))
    }
}

impl<C: AdditiveCipher> Party1AwaitingRound2<C> {
    /// Round 3: find Party 2's entries whose identifier is in V and add up
    /// their ciphertexts.
    ///
    /// Each entry `H(w)^k2` is raised to k1 and looked up among the
    /// doubly-blinded `(H(v)^k1)^k2` values Party 2 returned, so both sides of
    /// the comparison carry exactly k1 and k2.
    ///
    /// When nothing matches the aggregate is a fresh encryption of 0, which
    /// Party 2 cannot tell apart from a real sum of zero.
    ///
    /// # Errors
    /// Returns `PsiSumError::InvalidMessage` if an element is not reduced
    /// modulo p or the doubly-blinded list does not match the round 1 size.
    #[instrument(skip_all, err(Debug), fields(entries = message.entries.len()))]
    pub fn round3(
        self,
        message: Round2Message<C::PublicKey, C::Ciphertext>,
    ) -> Result<Round3Output<C::Ciphertext>> {
        if message.double_blinded.len() != self.sent {
            return Err(PsiSumError::InvalidMessage(format!(
                "expected {} double-blinded values, received {}",
                self.sent,
                message.double_blinded.len()
            )));
        }
        validate_elements(&message.double_blinded, &self.params, "double-blinded")?;
        validate_elements(
            message.entries.iter().map(|entry| &entry.blinded),
            &self.params,
            "entry",
        )?;

        let double_blinded_set: HashSet<&BlindedValue> = message.double_blinded.iter().collect();
        let reblinded: Vec<BlindedValue> = message
            .entries
            .par_iter()
            .map(|entry| reblind(&entry.blinded, &self.exponent, &self.params))
            .collect();

        let mut matched_indices = Vec::new();
        let mut aggregate: Option<C::Ciphertext> = None;
        for (index, (entry, value)) in message.entries.iter().zip(&reblinded).enumerate() {
            if !double_blinded_set.contains(value) {
                continue;
            }
            matched_indices.push(index);
            aggregate = Some(match aggregate {
                None => entry.ciphertext.clone(),
                Some(sum) => C::add(&message.public_key, &sum, &entry.ciphertext),
            });
        }
        debug!(matched = matched_indices.len(), "membership test done");

        let aggregate =
            aggregate.unwrap_or_else(|| C::encrypt(&message.public_key, 0, &mut OsRng));

        info!(matched = matched_indices.len(), "Party 1 round 3 complete");
        Ok(Round3Output {
            message: Round3Message { aggregate },
            matched_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::ToyCipher;
    use crate::group::{hash_to_group, GroupParameters};
    use crate::messages::EncryptedEntry;
    use crate::state::Party2;
    use num_bigint_dig::BigUint;

    fn party1(ids: &[&str]) -> Party1<ToyCipher> {
        Party1::new(ids, GroupParameters::mersenne_31()).unwrap()
    }

    #[test]
    fn test_round1_single_item() {
        let (_state, msg) = party1(&["alice"]).round1();
        assert_eq!(msg.len(), 1);
    }

    #[test]
    fn test_round1_keeps_blinded_set() {
        let (state, msg) = party1(&["alice", "bob", "carol"]).round1();
        assert_eq!(msg.len(), 3);
        let sent: HashSet<_> = msg.blinded.iter().cloned().collect();
        assert_eq!(&sent, state.blinded_set());
    }

    #[test]
    fn test_round1_counts_colliding_identifiers() {
        // Both identifiers hash to 1066211184 modulo 2^31 - 1.
        let params = GroupParameters::mersenne_31();
        assert_eq!(
            hash_to_group("id-68229", &params),
            hash_to_group("id-75629", &params)
        );

        let (state, msg) = party1(&["id-68229", "id-75629"]).round1();
        assert_eq!(msg.len(), 2);
        assert_eq!(state.sent, 2);
        assert_eq!(state.blinded_set().len(), 1);
    }

    #[test]
    fn test_round1_shuffles_output() {
        let ids: Vec<String> = (0..32).map(|i| format!("user-{}", i)).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        let reordered = (0..8).any(|_| {
            let party = party1(&ids);
            let in_order = blind_identifiers(&party.identifiers, &party.exponent, &party.params);
            let (_state, msg) = party.round1();
            msg.blinded != in_order
        });
        assert!(reordered);
    }

    #[test]
    fn test_round1_hides_hashes() {
        let params = GroupParameters::mersenne_31();
        let (_state, msg) = party1(&["alice", "bob"]).round1();
        for id in ["alice", "bob"] {
            let hashed = hash_to_group(id, &params);
            assert!(msg.blinded.iter().all(|b| *b.value() != hashed));
        }
    }

    #[test]
    fn test_round1_empty_set() {
        let (state, msg) = party1(&[]).round1();
        assert!(msg.is_empty());
        assert!(state.blinded_set().is_empty());
    }

    #[test]
    fn test_round3_rejects_wrong_double_blinded_count() {
        let (state, _msg) = party1(&["alice", "bob"]).round1();
        let party2 =
            Party2::new(&[("alice", 10u64)], GroupParameters::mersenne_31(), &ToyCipher).unwrap();
        let message = Round2Message::new(vec![], vec![], *party2.public_key());
        let result = state.round3(message);
        assert!(matches!(result, Err(PsiSumError::InvalidMessage(_))));
    }

    #[test]
    fn test_round3_accepts_colliding_identifiers() {
        let (state, msg) = party1(&["id-68229", "id-75629"]).round1();
        let party2 =
            Party2::new(&[("id-68229", 5u64)], GroupParameters::mersenne_31(), &ToyCipher).unwrap();
        let public_key = *party2.public_key();
        let (_p2, reply) = party2.round2(msg).unwrap();
        assert_eq!(reply.double_blinded.len(), 2);

        let output = state.round3(reply).unwrap();
        assert_eq!(output.intersection_size(), 1);
        assert_eq!(output.message.aggregate.value() / public_key.value(), 5);
    }

    #[test]
    fn test_round3_rejects_unreduced_entry() {
        let (state, msg) = party1(&["alice"]).round1();
        let party2 =
            Party2::new(&[("alice", 10u64)], GroupParameters::mersenne_31(), &ToyCipher).unwrap();
        let public_key = *party2.public_key();
        let (_p2, mut reply) = party2.round2(msg).unwrap();
        reply.entries.push(EncryptedEntry {
            blinded: BlindedValue::new(BigUint::from(u64::MAX)),
            ciphertext: reply.entries[0].ciphertext,
        });
        assert_eq!(reply.public_key, public_key);
        let result = state.round3(reply);
        assert_eq!(
            result,
            Err(PsiSumError::InvalidMessage(
                "entry element 1 is not reduced modulo p".to_string()
            ))
        );
    }

    #[test]
    fn test_round3_matched_indices_point_at_intersection() {
        let (state, msg) = party1(&["alice", "bob", "carol"]).round1();
        let party2 = Party2::new(
            &[("alice", 10u64), ("dave", 20), ("carol", 30), ("erin", 40)],
            GroupParameters::mersenne_31(),
            &ToyCipher,
        )
        .unwrap();
        let public_key = *party2.public_key();
        let (_p2, reply) = party2.round2(msg).unwrap();
        let entries = reply.entries.clone();

        let output = state.round3(reply).unwrap();
        assert_eq!(output.intersection_size(), 2);

        // The matched ciphertexts are exactly those encrypting 10 and 30.
        let mut matched: Vec<u64> = output
            .matched_indices
            .iter()
            .map(|&i| entries[i].ciphertext.value() / public_key.value())
            .collect();
        matched.sort_unstable();
        assert_eq!(matched, vec![10, 30]);
    }

    #[test]
    fn test_round3_no_match_encrypts_zero() {
        let (state, msg) = party1(&["a", "b"]).round1();
        let party2 = Party2::new(
            &[("c", 5u64), ("d", 7)],
            GroupParameters::mersenne_31(),
            &ToyCipher,
        )
        .unwrap();
        let public_key = *party2.public_key();
        let (_p2, reply) = party2.round2(msg).unwrap();

        let output = state.round3(reply).unwrap();
        assert!(output.matched_indices.is_empty());
        assert_eq!(output.message.aggregate.value() / public_key.value(), 0);
    }
}
