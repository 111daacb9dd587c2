use std::{io, num::NonZeroUsize};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fhe_tally::{bfv::DEFAULT_DEGREE, ElectionParameters};

/// Encrypted election: votes are encrypted one-hot, tallied homomorphically and
/// only the final counts are decrypted.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Number of candidates on the ballot.
    pub candidates: NonZeroUsize,

    /// Cast this many random votes instead of reading votes from stdin.
    #[arg(long, value_name = "VOTES")]
    pub simulate: Option<NonZeroUsize>,

    /// Number of parties sharing the decryption key.
    #[arg(long, default_value = "1")]
    pub parties: NonZeroUsize,

    /// Largest electorate the plaintext modulus must accommodate.
    #[arg(long, value_name = "VOTERS")]
    pub expected_voters: Option<usize>,

    /// Degree of the polynomial modulus.
    #[arg(long, default_value_t = DEFAULT_DEGREE)]
    pub degree: usize,

    /// Override the plaintext modulus picked from the expected electorate.
    #[arg(long)]
    pub plaintext_modulus: Option<u64>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn parameters(&self) -> ElectionParameters {
        let voters = self
            .expected_voters
            .or(self.simulate.map(NonZeroUsize::get))
            .unwrap_or(0);
        let parameters = ElectionParameters::for_voters(voters).with_degree(self.degree);
        match self.plaintext_modulus {
            Some(modulus) => parameters.with_plaintext_modulus(modulus),
            None => parameters,
        }
    }

    /// Installs the log subscriber. `RUST_LOG` takes precedence over `-v`.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}
