//! # Private Intersection-Sum Protocol
//!
//! This library implements a two-party Private Intersection-Sum protocol in the
//! semi-honest model, combining DDH-based blinding in `Z_p^*` with an
//! additive-homomorphic cipher.
//!
//! Party 1 holds a set of identifiers V. Party 2 holds (identifier, value)
//! pairs W. At the end Party 2 learns the sum of the values whose identifier is
//! in both sets, Party 1 learns how many entries matched, and neither learns
//! which of the other's identifiers were involved.
//!
//! ## Features
//!
//! - **Transport Agnostic**: Each round returns a plain message value; moving it
//!   between processes is left to the caller.
//! - **Type-State Pattern**: Each party is a chain of state types, so rounds
//!   run exactly once and in order.
//! - **Pluggable Cipher**: Aggregation goes through [`AdditiveCipher`]. The toy
//!   scheme of the reference scenario and Paillier are provided.
//! - **Serialization Agnostic**: With the `serde` feature every message derives
//!   `Serialize`/`Deserialize`.
//!
//! ## Protocol Overview
//!
//! 1. **Round 1** (Party 1): send `H(v)^k1` for every v in V, shuffled.
//! 2. **Round 2** (Party 2): send `Z = {(H(v)^k1)^k2}` shuffled, and the pairs
//!    `(H(w)^k2, Enc(t))` for every (w, t) in W, shuffled as units.
//! 3. **Round 3** (Party 1): raise each `H(w)^k2` to k1, keep the entries that
//!    land in Z and add their ciphertexts homomorphically.
//! 4. **Finalize** (Party 2): decrypt the aggregate.
//!
//! ## Example Usage
//!
//! ```ignore
//! use psi_sum_protocol::{GroupParameters, Party1, Party2, ToyCipher};
//!
//! let params = GroupParameters::mersenne_31();
//! let party1 = Party1::<ToyCipher>::new(&["alice", "bob", "carol"], params.clone())?;
//! let party2 = Party2::new(&[("alice", 10), ("dave", 20), ("carol", 30)], params, &ToyCipher)?;
//!
//! let (party1, round1) = party1.round1();
//! let (party2, round2) = party2.round2(round1)?;
//! let round3 = party1.round3(round2)?;
//! assert_eq!(party2.finalize(round3.message)?, 40);
//! # Ok::<(), psi_sum_protocol::PsiSumError>(())
//! ```
//!
//! ## Security Considerations
//!
//! - Semi-honest only. A malicious party can deviate undetected.
//! - Messages MUST travel over an authenticated, confidential channel.
//! - [`ToyCipher`] is not semantically secure. Use [`PaillierCipher`] or
//!   another sound additive scheme outside of demonstrations.
//! - The group modulus is a shared precondition; mismatched moduli give wrong
//!   results, not errors.
//!
//! ## Modules
//!
//! - [`group`] - Hashing into the group, exponentiation, blinding
//! - [`cipher`] - Additive-homomorphic ciphers
//! - [`messages`] - Message types for protocol exchange
//! - [`state`] - Party state types (type-state pattern)
//! - [`protocol`] - In-memory orchestration
//! - [`error`] - Error types

pub use cipher::{AdditiveCipher, KeyPair, PaillierCipher, ToyCipher};
pub use error::{PsiSumError, Result};
pub use group::{BlindedValue, GroupParameters, PrivateExponent};
pub use messages::{
    EncryptedEntry, IntersectionSumResult, Round1Message, Round2Message, Round3Message,
    Round3Output,
};
pub use protocol::{run_intersection_sum, IntersectionSumProtocol};
pub use state::{Party1, Party1AwaitingRound2, Party2, Party2AwaitingRound3};

pub mod cipher;
pub mod error;
pub mod group;
pub mod messages;
mod party1;
mod party2;
pub mod protocol;
pub mod state;
