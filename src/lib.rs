//! Secret-ballot tallying over fully homomorphic encryption.
//!
//! A vote for one of `n` candidates is a one-hot vector of `n` bits, each encrypted
//! separately. Ballots are summed column-wise while still encrypted, so the tally
//! authority only ever decrypts the final per-candidate totals.
//!
//! ```no_run
//! # use fhe_tally::{BfvBackend, Election, ElectionParameters, VoteError};
//! # fn main() -> Result<(), VoteError> {
//! let backend = BfvBackend::from_parameters(&ElectionParameters::for_voters(100))?;
//! let (election, authority) = Election::setup(backend, 3)?;
//! election.open()?;
//!
//! let encoder = election.encoder();
//! election.cast(encoder.encode(2)?)?;
//! election.cast(encoder.encode(0)?)?;
//!
//! election.close()?;
//! let result = election.finalize(&authority)?;
//! assert_eq!(result.count(2), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod ballot;
pub mod bfv;
pub mod committee;
pub mod decode;
pub mod election;
pub mod error;
pub mod input;
pub mod tally;

#[cfg(test)]
mod testing;

pub use crate::{
    backend::HomomorphicBackend,
    ballot::{Ballot, BallotEncoder},
    bfv::{BfvBackend, ElectionParameters},
    committee::{Committee, MultipartyBfvBackend},
    decode::{decode, TallyResult},
    election::{Election, ElectionAuthority, Phase},
    error::VoteError,
    input::{parse_vote, VoteInput, VoteReader},
    tally::{BallotSum, TallyVector},
};
