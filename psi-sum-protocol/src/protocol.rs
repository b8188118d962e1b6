//! In-memory orchestration of a full protocol run.

use crate::cipher::{AdditiveCipher, ToyCipher};
use crate::error::Result;
use crate::group::GroupParameters;
use crate::messages::IntersectionSumResult;
use crate::state::{Party1, Party2};
use num_bigint_dig::BigUint;
use tracing::{info, instrument};

/// Runs both parties in one process, passing each message by value.
///
/// Any failing round aborts the run; there is no retry.
#[derive(Debug, Clone)]
pub struct IntersectionSumProtocol<C> {
    params: GroupParameters,
    cipher: C,
}

impl<C: AdditiveCipher> IntersectionSumProtocol<C> {
    pub fn new(params: GroupParameters, cipher: C) -> Self {
        Self { params, cipher }
    }

    /// Run round 1 → round 2 → round 3 → finalize.
    ///
    /// # Arguments
    /// * `identifiers` - Party 1's identifier set V
    /// * `weighted` - Party 2's (identifier, value) pairs W
    ///
    /// # Errors
    /// Returns the first error raised by either party.
    #[instrument(skip_all, err(Debug), fields(v = identifiers.len(), w = weighted.len()))]
    pub fn run<S, T>(&self, identifiers: &[S], weighted: &[(T, u64)]) -> Result<IntersectionSumResult>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let party1 = Party1::<C>::new(identifiers, self.params.clone())?;
        let party2 = Party2::new(weighted, self.params.clone(), &self.cipher)?;

        let (party1, round1) = party1.round1();
        let (party2, round2) = party2.round2(round1)?;
        let round3 = party1.round3(round2)?;
        let intersection_size = round3.intersection_size();
        let sum = party2.finalize(round3.message)?;

        info!(intersection_size, "intersection-sum run complete");
        Ok(IntersectionSumResult {
            sum,
            intersection_size,
        })
    }
}

/// Compute the intersection-sum of `identifier_set` and `weighted_set` under
/// the toy cipher.
///
/// # Errors
/// Returns `PsiSumError::InvalidModulus` before any round runs if
/// `group_modulus` is not a prime greater than 2, and
/// `PsiSumError::DuplicateIdentifier` for repeated identifiers.
pub fn run_intersection_sum<S, T>(
    identifier_set: &[S],
    weighted_set: &[(T, u64)],
    group_modulus: &BigUint,
) -> Result<u64>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let params = GroupParameters::new(group_modulus.clone())?;
    IntersectionSumProtocol::new(params, ToyCipher)
        .run(identifier_set, weighted_set)
        .map(|result| result.sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::PaillierCipher;
    use crate::error::PsiSumError;

    fn mersenne() -> BigUint {
        GroupParameters::mersenne_31().modulus().clone()
    }

    #[test]
    fn test_invalid_modulus_fails_fast() {
        let result = run_intersection_sum(&["a"], &[("a", 1u64)], &BigUint::from(2u8));
        assert!(matches!(result, Err(PsiSumError::InvalidModulus(_))));

        let result = run_intersection_sum(&["a"], &[("a", 1u64)], &BigUint::from(91u8));
        assert!(matches!(result, Err(PsiSumError::InvalidModulus(_))));
    }

    #[test]
    fn test_empty_sets_sum_to_zero() {
        let empty_ids: [&str; 0] = [];
        let empty_weighted: [(&str, u64); 0] = [];
        assert_eq!(run_intersection_sum(&empty_ids, &[("a", 5u64)], &mersenne()), Ok(0));
        assert_eq!(run_intersection_sum(&["a"], &empty_weighted, &mersenne()), Ok(0));
        assert_eq!(run_intersection_sum(&empty_ids, &empty_weighted, &mersenne()), Ok(0));
    }

    #[test]
    fn test_duplicate_identifier_aborts() {
        let result = run_intersection_sum(&["a", "a"], &[("a", 5u64)], &mersenne());
        assert!(matches!(result, Err(PsiSumError::DuplicateIdentifier(_))));
    }

    #[test]
    fn test_run_reports_intersection_size() {
        let protocol = IntersectionSumProtocol::new(GroupParameters::mersenne_31(), ToyCipher);
        let result = protocol
            .run(
                &["alice", "bob", "carol"],
                &[("alice", 10u64), ("dave", 20), ("carol", 30)],
            )
            .unwrap();
        assert_eq!(
            result,
            IntersectionSumResult {
                sum: 40,
                intersection_size: 2
            }
        );
    }

    #[test]
    fn test_run_with_paillier() {
        let protocol =
            IntersectionSumProtocol::new(GroupParameters::mersenne_31(), PaillierCipher::new(256));
        let result = protocol
            .run(
                &["alice", "bob", "carol"],
                &[("alice", 10u64), ("dave", 20), ("carol", 30)],
            )
            .unwrap();
        assert_eq!(result.sum, 40);
    }

    #[test]
    fn test_paillier_sum_exceeds_toy_range() {
        // 3 * 4e9 would wrap under the toy cipher.
        let protocol =
            IntersectionSumProtocol::new(GroupParameters::mersenne_31(), PaillierCipher::new(256));
        let result = protocol
            .run(
                &["a", "b", "c"],
                &[("a", 4_000_000_000u64), ("b", 4_000_000_000), ("c", 4_000_000_000)],
            )
            .unwrap();
        assert_eq!(result.sum, 12_000_000_000);
    }
}
