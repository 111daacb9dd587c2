//! Encrypted one-hot ballots.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::trace;

use crate::{backend::HomomorphicBackend, error::VoteError};

/// An encrypted ballot: one ciphertext per candidate.
///
/// When produced by a [`BallotEncoder`], exactly one position encrypts 1 and all
/// others encrypt 0. Nothing checks this for ballots built with
/// [`Ballot::from_ciphertexts()`].
#[derive(Debug, Clone)]
pub struct Ballot<C> {
    bits: Box<[C]>,
}

impl<C> Ballot<C> {
    /// Wraps ciphertexts received from elsewhere, e.g. over the network.
    pub fn from_ciphertexts(bits: Vec<C>) -> Self {
        Self {
            bits: bits.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Only possible for ballots built with [`Ballot::from_ciphertexts()`].
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn ciphertexts(&self) -> &[C] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.bits.iter()
    }

    pub fn into_ciphertexts(self) -> Box<[C]> {
        self.bits
    }
}

/// Turns candidate choices into encrypted ballots.
///
/// The encoder only holds the public key, so it can be cloned freely and handed to
/// every voter or worker thread.
pub struct BallotEncoder<B: HomomorphicBackend> {
    backend: Arc<B>,
    public_key: Arc<B::PublicKey>,
    candidates: usize,
}

impl<B: HomomorphicBackend> Clone for BallotEncoder<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            public_key: Arc::clone(&self.public_key),
            candidates: self.candidates,
        }
    }
}

impl<B: HomomorphicBackend> BallotEncoder<B> {
    pub fn new(
        backend: Arc<B>,
        public_key: Arc<B::PublicKey>,
        candidates: usize,
    ) -> Result<Self, VoteError> {
        if candidates == 0 {
            return Err(VoteError::InvalidCandidateCount);
        }
        Ok(Self::from_parts(backend, public_key, candidates))
    }

    pub(crate) fn from_parts(
        backend: Arc<B>,
        public_key: Arc<B::PublicKey>,
        candidates: usize,
    ) -> Self {
        Self {
            backend,
            public_key,
            candidates,
        }
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// Encrypts the one-hot vector selecting `choice` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::OutOfRange`] if `choice >= candidates`, before anything is
    /// encrypted. If any bit fails to encrypt, no ballot is returned.
    pub fn encode(&self, choice: usize) -> Result<Ballot<B::Ciphertext>, VoteError> {
        if choice >= self.candidates {
            return Err(VoteError::OutOfRange {
                choice: choice as u64,
                candidates: self.candidates,
            });
        }

        let bits = (0..self.candidates)
            .map(|i| self.backend.encrypt(i == choice, &*self.public_key))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(candidates = self.candidates, "encoded ballot");
        Ok(Ballot::from_ciphertexts(bits))
    }

    /// Encodes many choices in parallel, failing as a whole if any ballot fails.
    pub fn encode_many(&self, choices: &[usize]) -> Result<Vec<Ballot<B::Ciphertext>>, VoteError> {
        choices
            .par_iter()
            .map(|&choice| self.encode(choice))
            .collect()
    }

    /// Fingerprints of every ciphertext in `ballot`, for diagnostic output.
    pub fn describe(&self, ballot: &Ballot<B::Ciphertext>) -> Vec<String> {
        ballot
            .iter()
            .map(|ct| self.backend.fingerprint(ct))
            .collect()
    }
}
