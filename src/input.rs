//! Interactive vote entry.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use tracing::debug;

use crate::error::VoteError;

/// A parsed vote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteInput {
    /// Zero-based index of the chosen candidate.
    Choice(usize),
    /// The `0` sentinel: stop accepting ballots.
    Stop,
}

/// Parses one token entered at the prompt.
///
/// Candidates are numbered from 1 at the prompt; `0` is the stop sentinel.
pub fn parse_vote(token: &str, candidates: usize) -> Result<VoteInput, VoteError> {
    let vote: u64 = token
        .parse()
        .map_err(|_| VoteError::InputFormat(token.to_owned()))?;
    match vote {
        0 => Ok(VoteInput::Stop),
        v if v <= candidates as u64 => Ok(VoteInput::Choice(v as usize - 1)),
        v => Err(VoteError::OutOfRange {
            choice: v,
            candidates,
        }),
    }
}

/// Whitespace-separated token reader over a line-oriented source.
pub struct VoteReader<R> {
    source: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> VoteReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    /// Next token, reading further lines as needed. `None` at end of input.
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            // Raw bytes: a line that is not UTF-8 yields tokens that fail to parse.
            let mut line = Vec::new();
            if self.source.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(
                String::from_utf8_lossy(&line)
                    .split_whitespace()
                    .map(str::to_owned),
            );
        }
    }

    /// Drops whatever is left of the current line.
    pub fn discard_line(&mut self) {
        self.pending.clear();
    }

    /// Prompts until a valid vote is entered.
    ///
    /// Invalid entries are reported on `out` and the rest of their line is discarded.
    /// End of input is treated as the stop sentinel.
    pub fn prompt<W: Write>(&mut self, out: &mut W, candidates: usize) -> io::Result<VoteInput> {
        loop {
            write!(
                out,
                "Please enter a vote (1-{candidates}), or 0 to terminate: "
            )?;
            out.flush()?;

            let Some(token) = self.next_token()? else {
                writeln!(out)?;
                return Ok(VoteInput::Stop);
            };
            match parse_vote(&token, candidates) {
                Ok(vote) => return Ok(vote),
                Err(err) => {
                    debug!(%err, "rejected vote input");
                    writeln!(out, "Invalid vote, please try again...")?;
                    self.discard_line();
                }
            }
        }
    }
}
