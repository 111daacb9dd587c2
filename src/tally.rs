//! Homomorphic accumulation of ballots.

use rayon::prelude::*;
use tracing::trace;

use crate::{backend::HomomorphicBackend, ballot::Ballot, error::VoteError};

/// Encrypted running totals, one ciphertext per candidate.
///
/// Column `i` encrypts the number of accumulated ballots that selected candidate `i`,
/// provided every ballot was one-hot. The number of ballots is public and tracked in
/// the clear.
#[derive(Debug, Clone)]
pub struct TallyVector<C> {
    columns: Box<[C]>,
    ballots: u64,
}

/// Column-wise sum of a batch of ballots, ready to be merged into a tally.
#[derive(Debug, Clone)]
pub struct BallotSum<C> {
    columns: Vec<C>,
    ballots: u64,
}

impl<C> BallotSum<C> {
    pub fn ballots(&self) -> u64 {
        self.ballots
    }
}

#[allow(clippy::len_without_is_empty)]
impl<C: Clone + Send + Sync> TallyVector<C> {
    /// Starts a tally with `candidates` encryptions of zero.
    pub fn zero<B>(backend: &B, pk: &B::PublicKey, candidates: usize) -> Result<Self, VoteError>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        if candidates == 0 {
            return Err(VoteError::InvalidCandidateCount);
        }
        let columns = (0..candidates)
            .map(|_| backend.zero(pk))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            columns: columns.into_boxed_slice(),
            ballots: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    /// Number of ballots accumulated so far.
    pub fn ballots_cast(&self) -> u64 {
        self.ballots
    }

    fn check_shape(&self, found: usize) -> Result<(), VoteError> {
        if found != self.columns.len() {
            return Err(VoteError::ShapeMismatch {
                expected: self.columns.len(),
                found,
            });
        }
        Ok(())
    }

    fn check_capacity(&self, max: u64, additional: u64) -> Result<(), VoteError> {
        match self.ballots.checked_add(additional) {
            Some(total) if total <= max => Ok(()),
            _ => Err(VoteError::CapacityExceeded { max }),
        }
    }

    /// Adds `ballot` to every column.
    ///
    /// # Errors
    ///
    /// On shape mismatch or exceeded capacity the tally is left untouched.
    pub fn accumulate<B>(&mut self, backend: &B, ballot: Ballot<C>) -> Result<(), VoteError>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        self.check_shape(ballot.len())?;
        self.check_capacity(backend.max_count(), 1)?;

        for (column, bit) in self.columns.iter_mut().zip(ballot.iter()) {
            *column = backend.add(column, bit);
        }
        self.ballots += 1;
        trace!(ballots = self.ballots, "accumulated ballot");
        Ok(())
    }

    /// Sums a batch of ballots column-wise, in parallel, without touching any tally.
    ///
    /// Returns `Ok(None)` for an empty batch.
    pub fn fold_batch<B>(
        backend: &B,
        candidates: usize,
        ballots: Vec<Ballot<C>>,
    ) -> Result<Option<BallotSum<C>>, VoteError>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        if let Some(bad) = ballots.iter().find(|ballot| ballot.len() != candidates) {
            return Err(VoteError::ShapeMismatch {
                expected: candidates,
                found: bad.len(),
            });
        }

        let count = ballots.len() as u64;
        let columns = ballots
            .into_par_iter()
            .map(|ballot| ballot.into_ciphertexts().into_vec())
            .reduce_with(|lhs, rhs| {
                lhs.iter()
                    .zip(&rhs)
                    .map(|(l, r)| backend.add(l, r))
                    .collect()
            });
        Ok(columns.map(|columns| BallotSum {
            columns,
            ballots: count,
        }))
    }

    /// Adds a pre-folded batch to the tally, all or nothing.
    pub fn merge<B>(&mut self, backend: &B, sum: BallotSum<C>) -> Result<(), VoteError>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        self.check_shape(sum.columns.len())?;
        self.check_capacity(backend.max_count(), sum.ballots)?;

        for (column, partial) in self.columns.iter_mut().zip(&sum.columns) {
            *column = backend.add(column, partial);
        }
        self.ballots += sum.ballots;
        trace!(
            merged = sum.ballots,
            ballots = self.ballots,
            "merged ballot batch"
        );
        Ok(())
    }
}
