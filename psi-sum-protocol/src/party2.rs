//! Party 2: the weighted side. Runs round 2 and decrypts the result.

use crate::cipher::AdditiveCipher;
use crate::error::Result;
use crate::group::{blind_identifier, reblind_all, validate_elements};
use crate::messages::{EncryptedEntry, Round1Message, Round2Message, Round3Message};
use crate::state::{Party2, Party2AwaitingRound3};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::{info, instrument};

impl<C: AdditiveCipher> Party2<C> {
    /// Round 2: double-blind Party 1's values and send the blinded,
    /// encrypted weighted set.
    ///
    /// Both lists are shuffled independently. Entries are shuffled as whole
    /// records so each blinded identifier stays with its own ciphertext.
    ///
    /// # Errors
    /// Returns `PsiSumError::InvalidMessage` if a received element is not
    /// reduced modulo p.
    #[instrument(skip_all, err(Debug), fields(received = message.len(), entries = self.entries.len()))]
    pub fn round2(
        self,
        message: Round1Message,
    ) -> Result<(
        Party2AwaitingRound3<C>,
        Round2Message<C::PublicKey, C::Ciphertext>,
    )> {
        validate_elements(&message.blinded, &self.params, "round 1")?;

        let mut double_blinded = reblind_all(&message.blinded, &self.exponent, &self.params);
        double_blinded.shuffle(&mut OsRng);

        let public_key = &self.keypair.public_key;
        let mut entries: Vec<EncryptedEntry<C::Ciphertext>> = self
            .entries
            .par_iter()
            .map(|(identifier, value)| EncryptedEntry {
                blinded: blind_identifier(identifier, &self.exponent, &self.params),
                ciphertext: C::encrypt(public_key, *value, &mut OsRng),
            })
            .collect();
        entries.shuffle(&mut OsRng);

        info!(
            double_blinded = double_blinded.len(),
            entries = entries.len(),
            "Party 2 round 2 complete"
        );

        let reply = Round2Message::new(double_blinded, entries, public_key.clone());
        Ok((
            Party2AwaitingRound3 {
                keypair: self.keypair,
            },
            reply,
        ))
    }
}

impl<C: AdditiveCipher> Party2AwaitingRound3<C> {
    /// Decrypt the aggregate returned in round 3.
    ///
    /// This is the only point where the intersection-sum becomes known.
    #[instrument(skip_all, err(Debug))]
    pub fn finalize(self, message: Round3Message<C::Ciphertext>) -> Result<u64> {
        let sum = C::decrypt(
            &self.keypair.public_key,
            &self.keypair.secret_key,
            &message.aggregate,
        )?;
        info!("Party 2 decrypted the intersection-sum");
        Ok(sum)
    }
}
