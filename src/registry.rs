use std::collections::BTreeSet;

use crate::error::VoteError;

/// Voter IDs eligible to cast a vote.
#[derive(Debug, Clone, Default)]
pub struct VoterRoll {
    eligible: BTreeSet<i64>,
}

impl VoterRoll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll with voters `1..=count` registered.
    pub fn with_range(count: i64) -> Self {
        VoterRoll {
            eligible: (1..=count).collect(),
        }
    }

    /// Registering the same voter twice is a no-op.
    pub fn register(&mut self, voter_id: i64) -> Result<(), VoteError> {
        if voter_id < 1 {
            return Err(VoteError::InvalidVoterId(voter_id));
        }
        self.eligible.insert(voter_id);
        Ok(())
    }

    pub fn is_eligible(&self, voter_id: i64) -> bool {
        self.eligible.contains(&voter_id)
    }

    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}

/// Admissible candidate names. Holds no counts.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    names: BTreeSet<String>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>) -> Result<(), VoteError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VoteError::UnknownCandidate(name));
        }
        self.names.insert(name);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
