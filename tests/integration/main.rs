//! End-to-end tests over the real BFV backends.

use fhe_tally::{BfvBackend, ElectionParameters, TallyResult};

mod committee;
mod election;

pub fn small_backend() -> BfvBackend {
    BfvBackend::from_parameters(&ElectionParameters::for_voters(100)).unwrap()
}

pub fn assert_counts(result: &TallyResult, expected: &[u64]) {
    let counts: Vec<u64> = result.counts().values().copied().collect();
    assert_eq!(counts, expected, "unexpected tally {result:?}");
}
