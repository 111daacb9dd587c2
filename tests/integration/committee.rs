//! Elections decrypted by a committee of key holders.

use fhe_tally::{Election, ElectionParameters, MultipartyBfvBackend};

use crate::assert_counts;

#[test]
fn committee_tally_matches_votes() {
    let backend = MultipartyBfvBackend::from_parameters(&ElectionParameters::for_voters(50), 5)
        .unwrap();
    let (election, authority) = Election::setup(backend, 3).unwrap();
    election.open().unwrap();

    let encoder = election.encoder();
    let ballots = encoder.encode_many(&[1, 1, 0, 2, 1]).unwrap();
    election.cast_batch(ballots).unwrap();
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_counts(&result, &[1, 3, 1]);
}

#[test]
fn single_member_committee_behaves_like_single_key() {
    let backend = MultipartyBfvBackend::from_parameters(&ElectionParameters::default(), 1)
        .unwrap();
    let (election, authority) = Election::setup(backend, 2).unwrap();
    election.open().unwrap();
    election.cast(election.encoder().encode(1).unwrap()).unwrap();
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_counts(&result, &[0, 1]);
}
