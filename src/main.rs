mod cli;

use clap::Parser;
use fhe_tally::{
    BfvBackend, Election, ElectionAuthority, HomomorphicBackend, MultipartyBfvBackend,
    TallyResult, VoteInput, VoteReader,
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{distributions::Uniform, prelude::Distribution, thread_rng};
use rayon::prelude::*;
use std::{error::Error, io, time::Duration};
use stopwatch::Stopwatch;
use tracing::{error, info};

use crate::cli::Args;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    args.init_logging();

    let parameters = args.parameters();
    let candidates = args.candidates.get();

    println!("\n\x1b[1mPractical FHE: Secret Ballot\x1b[0m");
    println!("\t\x1b[1mCandidates:\x1b[0m\t\t{candidates}");
    println!("\t\x1b[1mParties:\x1b[0m\t\t{}", args.parties);
    println!("\t\x1b[1mDegree:\x1b[0m\t\t\t{}", parameters.degree);
    println!(
        "\t\x1b[1mPlaintext Modulus:\x1b[0m\t{}",
        parameters.plaintext_modulus
    );
    println!("\t\x1b[1mModuli:\x1b[0m\t\t\t{:?}", parameters.moduli);

    // A single party holds the whole secret key; otherwise the key is shared across a
    // committee and every party has to contribute to the decryption.
    if args.parties.get() == 1 {
        let backend = BfvBackend::from_parameters(&parameters)?;
        run(backend, &args)
    } else {
        let backend = MultipartyBfvBackend::from_parameters(&parameters, args.parties.get())?;
        run(backend, &args)
    }
}

fn run<B: HomomorphicBackend>(backend: B, args: &Args) -> Result<(), Box<dyn Error>> {
    let candidates = args.candidates.get();
    let keygen_timer = Stopwatch::start_new();
    let (election, authority) = Election::setup(backend, candidates)?;
    println!(
        "\t\x1b[1mKey Generation time:\x1b[0m\t{:#?}",
        keygen_timer.elapsed()
    );
    election.open()?;

    let result = match args.simulate {
        Some(votes) => simulate(&election, &authority, votes.get())?,
        None => interactive(&election, &authority)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

/// Reads votes from stdin until the `0` sentinel or end of input.
fn interactive<B: HomomorphicBackend>(
    election: &Election<B>,
    authority: &ElectionAuthority<B>,
) -> Result<TallyResult, Box<dyn Error>> {
    let candidates = election.candidates();
    let encoder = election.encoder();
    let mut reader = VoteReader::new(io::stdin().lock());
    let mut stdout = io::stdout();

    while let VoteInput::Choice(choice) = reader.prompt(&mut stdout, candidates)? {
        // A failed ballot is dropped; the votes cast so far stay in the tally.
        let ballot = match encoder.encode(choice) {
            Ok(ballot) => ballot,
            Err(err) => {
                error!(%err, "could not encrypt ballot");
                continue;
            }
        };
        println!("{}", encoder.describe(&ballot).join(" "));
        match election.cast(ballot) {
            Ok(cast) => info!(cast, "ballot accepted"),
            Err(err) => error!(%err, "ballot rejected"),
        }
    }

    election.close()?;
    Ok(election.finalize(authority)?)
}

/// Casts `num_votes` uniformly random votes and checks the decrypted tally
/// against the plaintext votes.
fn simulate<B: HomomorphicBackend>(
    election: &Election<B>,
    authority: &ElectionAuthority<B>,
    num_votes: usize,
) -> Result<TallyResult, Box<dyn Error>> {
    let candidates = election.candidates();
    println!("\t\x1b[1mVotes:\x1b[0m\t\t\t{num_votes}");

    let pb: ProgressBar = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    let total_timer = Stopwatch::start_new();

    let dist: Uniform<usize> = Uniform::new(0, candidates);
    let choices: Vec<usize> = (0..num_votes)
        .into_par_iter()
        .map(|_| dist.sample(&mut thread_rng()))
        .collect();

    // Encrypting the ballots is the bulk of the work. In a real election each voter
    // encrypts their own ballot and only the ciphertexts are published.
    pb.enable_steady_tick(Duration::from_millis(100));
    let encryption_timer = Stopwatch::start_new();
    let ballots = election.encoder().encode_many(&choices)?;
    pb.finish_and_clear();
    println!(
        "\t\x1b[1mTime to Encrypt Votes:\x1b[0m\t{:#?}",
        encryption_timer.elapsed()
    );

    let pb: ProgressBar = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    let tally_timer = Stopwatch::start_new();
    election.cast_batch(ballots)?;
    election.close()?;
    pb.finish_and_clear();
    println!(
        "\t\x1b[1mTally Execution time:\x1b[0m\t{:#?}",
        tally_timer.elapsed()
    );

    let pb: ProgressBar = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    let decryption_timer = Stopwatch::start_new();
    let result = election.finalize(authority)?;
    pb.finish_and_clear();
    println!(
        "\t\x1b[1mTally Decryption time:\x1b[0m\t{:#?}",
        decryption_timer.elapsed()
    );
    println!(
        "\t\x1b[1mTotal Execution time:\x1b[0m\t{:#?}",
        total_timer.elapsed()
    );

    // Only possible here because the simulation knows the plaintext votes.
    let mut expected = vec![0u64; candidates];
    for &choice in &choices {
        expected[choice] += 1;
    }
    for (candidate, &count) in expected.iter().enumerate() {
        if result.count(candidate) != Some(count) {
            return Err(format!(
                "candidate {} decrypted to {:?}, expected {count}",
                candidate + 1,
                result.count(candidate)
            )
            .into());
        }
    }
    Ok(result)
}

fn print_result(result: &TallyResult) {
    println!("\n\x1b[1mResult\x1b[0m");
    for (&candidate, &count) in result.counts() {
        println!("\tCandidate {}:\t{count}", candidate + 1);
    }
    println!("\t\x1b[1mBallots cast:\x1b[0m\t{}", result.ballots_cast());
    match result.leaders().as_slice() {
        [] => println!("\t\x1b[1mLeader:\x1b[0m\t\tnone"),
        [winner] => println!("\t\x1b[1mLeader:\x1b[0m\t\tcandidate {}", winner + 1),
        tied => {
            let names: Vec<String> = tied.iter().map(|c| (c + 1).to_string()).collect();
            println!("\t\x1b[1mLeader:\x1b[0m\t\ttie between {}", names.join(", "));
        }
    }
}
