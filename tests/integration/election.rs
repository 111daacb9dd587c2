//! Single-key election properties.

use std::sync::Arc;

use fhe_tally::{Ballot, Election, HomomorphicBackend, Phase, VoteError, VoteInput, VoteReader};

use crate::{assert_counts, small_backend};

#[test]
fn single_ballot_decodes_to_its_choice() {
    for candidates in 1..=4 {
        for choice in 0..candidates {
            let (election, authority) = Election::setup(small_backend(), candidates).unwrap();
            election.open().unwrap();
            let encoder = election.encoder();
            election.cast(encoder.encode(choice).unwrap()).unwrap();
            election.close().unwrap();

            let result = election.finalize(&authority).unwrap();
            let expected: Vec<u64> = (0..candidates).map(|i| u64::from(i == choice)).collect();
            assert_counts(&result, &expected);
        }
    }
}

#[test]
fn counts_sum_to_ballots_cast() {
    let choices = [0, 2, 1, 2, 2, 0, 1, 2];
    let (election, authority) = Election::setup(small_backend(), 3).unwrap();
    election.open().unwrap();
    let encoder = election.encoder();
    for &choice in &choices {
        election.cast(encoder.encode(choice).unwrap()).unwrap();
    }
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_eq!(result.total(), choices.len() as u64);
    assert_eq!(result.ballots_cast(), choices.len() as u64);
    assert_counts(&result, &[2, 2, 4]);
    assert_eq!(result.leaders(), [2]);
}

#[test]
fn accumulation_order_does_not_matter() {
    let tally_of = |order: [usize; 2]| {
        let (election, authority) = Election::setup(small_backend(), 2).unwrap();
        election.open().unwrap();
        let encoder = election.encoder();
        for choice in order {
            election.cast(encoder.encode(choice).unwrap()).unwrap();
        }
        election.close().unwrap();
        election.finalize(&authority).unwrap()
    };
    assert_eq!(tally_of([0, 1]), tally_of([1, 0]));
}

#[test]
fn encoding_twice_gives_fresh_ciphertexts() {
    let backend = small_backend();
    let (pk, sk) = backend.generate_keys().unwrap();
    let election = Election::new(Arc::new(backend), Arc::new(pk), 3).unwrap();
    let encoder = election.encoder();

    let first = encoder.encode(1).unwrap();
    let second = encoder.encode(1).unwrap();
    assert_ne!(encoder.describe(&first), encoder.describe(&second));

    for ballot in [first, second] {
        let bits: Vec<u64> = ballot
            .iter()
            .map(|ct| election.backend().decrypt(ct, &sk).unwrap())
            .collect();
        assert_eq!(bits, [0, 1, 0]);
    }
}

#[test]
fn short_ballot_is_rejected_and_tally_kept() {
    let backend = small_backend();
    let (pk, _) = backend.generate_keys().unwrap();
    let short = Ballot::from_ciphertexts(vec![
        backend.encrypt(true, &pk).unwrap(),
        backend.encrypt(false, &pk).unwrap(),
    ]);

    let (election, authority) = Election::setup(small_backend(), 3).unwrap();
    election.open().unwrap();
    let encoder = election.encoder();
    election.cast(encoder.encode(0).unwrap()).unwrap();

    let err = election.cast(short).unwrap_err();
    assert!(matches!(
        err,
        VoteError::ShapeMismatch {
            expected: 3,
            found: 2
        }
    ));
    assert_eq!(election.ballots_cast(), 1);

    election.close().unwrap();
    let result = election.finalize(&authority).unwrap();
    assert_counts(&result, &[1, 0, 0]);
}

#[test]
fn single_candidate_counts_every_ballot() {
    let (election, authority) = Election::setup(small_backend(), 1).unwrap();
    election.open().unwrap();
    let encoder = election.encoder();
    for _ in 0..6 {
        let ballot = encoder.encode(0).unwrap();
        assert_eq!(ballot.len(), 1);
        election.cast(ballot).unwrap();
    }
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_eq!(result.count(0), Some(6));
    assert_eq!(result.counts().len(), 1);
}

#[test]
fn sentinel_closes_without_casting() {
    let (election, authority) = Election::setup(small_backend(), 2).unwrap();
    election.open().unwrap();
    let encoder = election.encoder();

    let mut reader = VoteReader::new(&b"2\n1\n0\n2\n"[..]);
    let mut out = Vec::new();
    while let VoteInput::Choice(choice) = reader.prompt(&mut out, 2).unwrap() {
        election.cast(encoder.encode(choice).unwrap()).unwrap();
    }
    election.close().unwrap();
    assert_eq!(election.phase(), Phase::Closed);

    let result = election.finalize(&authority).unwrap();
    assert_eq!(result.ballots_cast(), 2);
    assert_counts(&result, &[1, 1]);
}

#[test]
fn empty_election_decodes_to_zero() {
    let (election, authority) = Election::setup(small_backend(), 3).unwrap();
    election.open().unwrap();
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_counts(&result, &[0, 0, 0]);
    assert!(result.leaders().is_empty());
}

#[test]
fn batch_and_sequential_casts_agree() {
    let choices = [3, 1, 1, 0, 3, 3, 2];
    let (election, authority) = Election::setup(small_backend(), 4).unwrap();
    election.open().unwrap();
    let encoder = election.encoder();

    election
        .cast_batch(encoder.encode_many(&choices[..4]).unwrap())
        .unwrap();
    for &choice in &choices[4..] {
        election.cast(encoder.encode(choice).unwrap()).unwrap();
    }
    election.close().unwrap();

    let result = election.finalize(&authority).unwrap();
    assert_counts(&result, &[1, 2, 1, 3]);
}
