//! Error types for the intersection-sum protocol.

use thiserror::Error;

/// Errors that can occur during intersection-sum protocol execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsiSumError {
    /// The group modulus is not a prime greater than 2.
    #[error("Invalid group modulus: {0}")]
    InvalidModulus(String),

    /// An input set contains the same identifier twice.
    #[error("Duplicate identifier in input set: {0}")]
    DuplicateIdentifier(String),

    /// A message received from the other party is malformed.
    #[error("Invalid protocol message: {0}")]
    InvalidMessage(String),

    /// The homomorphic cipher failed.
    #[error("Cipher error: {0}")]
    Cipher(String),
}

/// Result type for intersection-sum operations.
pub type Result<T> = std::result::Result<T, PsiSumError>;
