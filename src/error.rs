use std::io;

use thiserror::Error;

/// First point at which a chain fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ledger integrity violated at block {index}: {reason}")]
pub struct IntegrityViolation {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("invalid voter id: {0}")]
    InvalidVoterId(i64),

    #[error("voter {0} has already cast a vote")]
    DuplicateVote(i64),

    #[error("candidate {0:?} does not exist")]
    UnknownCandidate(String),

    #[error(transparent)]
    IntegrityViolation(#[from] IntegrityViolation),

    #[error("failed to load stored ledger: {0}")]
    Load(#[source] io::Error),

    #[error("failed to persist ledger after {attempts} attempt(s): {source}")]
    Persistence {
        attempts: u32,
        #[source]
        source: io::Error,
    },
}

impl VoteError {
    /// User-input rejections that leave the ledger untouched and trusted.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VoteError::InvalidVoterId(_) | VoteError::DuplicateVote(_) | VoteError::UnknownCandidate(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}
