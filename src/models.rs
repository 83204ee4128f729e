use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: i64,
    pub candidate: String,
}

impl Vote {
    pub fn new(voter_id: i64, candidate: impl Into<String>) -> Self {
        Vote {
            voter_id,
            candidate: candidate.into(),
        }
    }
}

/// One ledger entry. `votes` is the cumulative history up to and including
/// the vote this block admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub previous_hash: String,
    pub current_hash: String,
    pub votes: Vec<Vote>,
}

impl Block {
    pub fn genesis() -> Self {
        Block {
            previous_hash: String::new(),
            current_hash: String::new(),
            votes: Vec::new(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_empty() && self.current_hash.is_empty() && self.votes.is_empty()
    }

    /// The vote this block admitted. `None` for genesis.
    pub fn admitted_vote(&self) -> Option<&Vote> {
        self.votes.last()
    }
}

/// Flattened view of one accepted vote, as served by `/getHistory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub voter_id: i64,
    pub candidate: String,
    pub block_hash: String,
}
