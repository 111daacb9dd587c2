use std::error::Error as StdError;

use thiserror::Error;

use crate::election::Phase;

/// Boxed error reported by a cryptographic backend.
pub type BackendError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced while casting, tallying or decoding votes.
#[derive(Error, Debug)]
pub enum VoteError {
    // Recoverable at the prompt
    #[error("malformed vote input {0:?}")]
    InputFormat(String),

    #[error("choice {choice} is out of range for {candidates} candidates")]
    OutOfRange { choice: u64, candidates: usize },

    #[error("ballot has {found} ciphertexts but the tally has {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("the tally cannot hold more than {max} votes per candidate")]
    CapacityExceeded { max: u64 },

    #[error("candidate count must be at least 1")]
    InvalidCandidateCount,

    #[error("election is {actual}, expected {expected}")]
    InvalidPhase { expected: Phase, actual: Phase },

    #[error("encryption failed: {0}")]
    Encryption(#[source] BackendError),

    #[error("decryption failed: {0}")]
    Decryption(#[source] BackendError),

    #[error("invalid encryption parameters: {0}")]
    Parameters(#[source] BackendError),
}

impl VoteError {
    /// Errors a voter can recover from by entering another vote.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InputFormat(_) | Self::OutOfRange { .. })
    }
}
