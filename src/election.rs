//! Election session: lifecycle, shared tally and key custody.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, info};

use crate::{
    backend::HomomorphicBackend,
    ballot::{Ballot, BallotEncoder},
    decode::{decode, TallyResult},
    error::VoteError,
    tally::TallyVector,
};

/// Lifecycle of an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Keys generated, tally initialized to zero.
    Created,
    /// Ballots are being cast.
    Accepting,
    /// No further ballots accepted.
    Closed,
    /// The result has been decrypted. Terminal.
    Decoded,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Accepting => "accepting ballots",
            Self::Closed => "closed",
            Self::Decoded => "decoded",
        })
    }
}

/// Holder of the private key. Only used to finalize an election.
pub struct ElectionAuthority<B: HomomorphicBackend> {
    private_key: B::PrivateKey,
}

impl<B: HomomorphicBackend> ElectionAuthority<B> {
    pub fn new(private_key: B::PrivateKey) -> Self {
        Self { private_key }
    }
}

struct State<C> {
    phase: Phase,
    tally: TallyVector<C>,
    result: Option<TallyResult>,
}

/// A single election over a fixed set of candidates.
///
/// The election only knows the public key. Ballots may be encoded concurrently by
/// any number of [`BallotEncoder`]s; casting serializes on the tally lock so that no
/// caller ever sees a partially updated tally.
pub struct Election<B: HomomorphicBackend> {
    backend: Arc<B>,
    public_key: Arc<B::PublicKey>,
    candidates: usize,
    state: Mutex<State<B::Ciphertext>>,
}

impl<B: HomomorphicBackend> Election<B> {
    /// Generates a key pair and sets up an election, returning the authority that
    /// holds the private key alongside it.
    pub fn setup(
        backend: B,
        candidates: usize,
    ) -> Result<(Self, ElectionAuthority<B>), VoteError> {
        let (public_key, private_key) = backend.generate_keys()?;
        let election = Self::new(Arc::new(backend), Arc::new(public_key), candidates)?;
        Ok((election, ElectionAuthority::new(private_key)))
    }

    /// Creates an election for an existing public key.
    pub fn new(
        backend: Arc<B>,
        public_key: Arc<B::PublicKey>,
        candidates: usize,
    ) -> Result<Self, VoteError> {
        let tally = TallyVector::zero(backend.as_ref(), &*public_key, candidates)?;
        debug!(candidates, "election created");
        Ok(Self {
            backend,
            public_key,
            candidates,
            state: Mutex::new(State {
                phase: Phase::Created,
                tally,
                result: None,
            }),
        })
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Encoder for this election's public key.
    pub fn encoder(&self) -> BallotEncoder<B> {
        // `candidates` was validated when the tally was created.
        BallotEncoder::from_parts(
            Arc::clone(&self.backend),
            Arc::clone(&self.public_key),
            self.candidates,
        )
    }

    fn lock(&self) -> MutexGuard<'_, State<B::Ciphertext>> {
        // The state is only mutated after every fallible step has passed, so a
        // poisoned lock still holds a consistent tally.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(
        state: &mut State<B::Ciphertext>,
        from: Phase,
        to: Phase,
    ) -> Result<(), VoteError> {
        if state.phase != from {
            return Err(VoteError::InvalidPhase {
                expected: from,
                actual: state.phase,
            });
        }
        state.phase = to;
        info!(phase = %to, "election phase changed");
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn ballots_cast(&self) -> u64 {
        self.lock().tally.ballots_cast()
    }

    /// Starts accepting ballots.
    pub fn open(&self) -> Result<(), VoteError> {
        Self::transition(&mut self.lock(), Phase::Created, Phase::Accepting)
    }

    /// Stops accepting ballots.
    pub fn close(&self) -> Result<(), VoteError> {
        Self::transition(&mut self.lock(), Phase::Accepting, Phase::Closed)
    }

    fn ensure_accepting(state: &State<B::Ciphertext>) -> Result<(), VoteError> {
        if state.phase != Phase::Accepting {
            return Err(VoteError::InvalidPhase {
                expected: Phase::Accepting,
                actual: state.phase,
            });
        }
        Ok(())
    }

    /// Adds one ballot to the tally and returns the number of ballots cast so far.
    pub fn cast(&self, ballot: Ballot<B::Ciphertext>) -> Result<u64, VoteError> {
        let mut state = self.lock();
        Self::ensure_accepting(&state)?;
        state.tally.accumulate(self.backend.as_ref(), ballot)?;
        Ok(state.tally.ballots_cast())
    }

    /// Adds a batch of ballots with a single update of the tally.
    ///
    /// The batch is summed outside the lock; either every ballot is counted or none is.
    pub fn cast_batch(&self, ballots: Vec<Ballot<B::Ciphertext>>) -> Result<u64, VoteError> {
        Self::ensure_accepting(&self.lock())?;
        let sum = TallyVector::fold_batch(self.backend.as_ref(), self.candidates, ballots)?;

        let mut state = self.lock();
        Self::ensure_accepting(&state)?;
        if let Some(sum) = sum {
            state.tally.merge(self.backend.as_ref(), sum)?;
        }
        Ok(state.tally.ballots_cast())
    }

    /// Decrypts the closed tally. Succeeds once; a failed decryption leaves the
    /// election closed.
    pub fn finalize(&self, authority: &ElectionAuthority<B>) -> Result<TallyResult, VoteError> {
        let mut state = self.lock();
        if state.phase != Phase::Closed {
            return Err(VoteError::InvalidPhase {
                expected: Phase::Closed,
                actual: state.phase,
            });
        }
        let result = decode(self.backend.as_ref(), &state.tally, &authority.private_key)?;
        Self::transition(&mut state, Phase::Closed, Phase::Decoded)?;
        state.result = Some(result.clone());
        Ok(result)
    }

    /// The decoded result, once the election has been finalized.
    pub fn result(&self) -> Option<TallyResult> {
        self.lock().result.clone()
    }
}
