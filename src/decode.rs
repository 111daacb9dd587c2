//! Decryption of the final tally.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::{backend::HomomorphicBackend, error::VoteError, tally::TallyVector};

/// Plaintext election result: candidate index to number of votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyResult {
    counts: BTreeMap<usize, u64>,
    ballots_cast: u64,
}

impl TallyResult {
    pub fn count(&self, candidate: usize) -> Option<u64> {
        self.counts.get(&candidate).copied()
    }

    pub fn counts(&self) -> &BTreeMap<usize, u64> {
        &self.counts
    }

    /// Sum of all decrypted counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of ballots the tally accumulated.
    pub fn ballots_cast(&self) -> u64 {
        self.ballots_cast
    }

    /// Candidates with the highest count; several on a tie, none if nobody voted.
    pub fn leaders(&self) -> Vec<usize> {
        let Some(&best) = self.counts.values().max() else {
            return Vec::new();
        };
        if best == 0 {
            return Vec::new();
        }
        self.counts
            .iter()
            .filter(|&(_, &count)| count == best)
            .map(|(&candidate, _)| candidate)
            .collect()
    }
}

/// Decrypts every column of `tally` with the private key.
///
/// # Errors
///
/// Any decryption failure aborts the whole decode; no partial result is returned.
pub fn decode<B: HomomorphicBackend>(
    backend: &B,
    tally: &TallyVector<B::Ciphertext>,
    sk: &B::PrivateKey,
) -> Result<TallyResult, VoteError> {
    let counts = tally
        .columns()
        .iter()
        .enumerate()
        .map(|(candidate, ct)| Ok((candidate, backend.decrypt(ct, sk)?)))
        .collect::<Result<BTreeMap<_, _>, VoteError>>()?;

    let result = TallyResult {
        counts,
        ballots_cast: tally.ballots_cast(),
    };
    if result.total() != result.ballots_cast {
        warn!(
            total = result.total(),
            ballots = result.ballots_cast,
            "decoded counts do not add up to the ballots cast, the tally contains malformed ballots"
        );
    }
    Ok(result)
}
