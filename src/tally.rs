// Results are always derived from the ledger; nothing here is stored state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::registry::CandidateRegistry;

pub type Tally = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Winner { candidate: String, votes: u64 },
    /// Every candidate sharing the top count. Empty when nobody is registered.
    Tie { candidates: Vec<String>, votes: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub tally: Tally,
    pub outcome: Outcome,
}

/// Count accepted votes per candidate. Every registered candidate appears,
/// including those with no votes.
pub fn tally(ledger: &Ledger, candidates: &CandidateRegistry) -> Tally {
    let mut counts: Tally = candidates.names().map(|name| (name.to_string(), 0)).collect();
    for vote in ledger.votes() {
        *counts.entry(vote.candidate.clone()).or_insert(0) += 1;
    }
    counts
}

/// A winner needs the strict maximum; any shared maximum is a tie, including
/// the all-zero case before any vote is cast.
pub fn determine_winner(tally: &Tally) -> Outcome {
    let max = tally.values().copied().max().unwrap_or(0);
    let mut leaders: Vec<String> = tally
        .iter()
        .filter(|(_, count)| **count == max)
        .map(|(name, _)| name.clone())
        .collect();

    if leaders.len() == 1 {
        Outcome::Winner {
            candidate: leaders.remove(0),
            votes: max,
        }
    } else {
        Outcome::Tie {
            candidates: leaders,
            votes: max,
        }
    }
}

pub fn results(ledger: &Ledger, candidates: &CandidateRegistry) -> ElectionResults {
    let tally = tally(ledger, candidates);
    let outcome = determine_winner(&tally);
    ElectionResults { tally, outcome }
}
