use crate::error::VoteError;
use crate::ledger::Ledger;
use crate::registry::{CandidateRegistry, VoterRoll};

/// Admission policy for a vote. Checks run in a fixed order and the first
/// failure wins: eligibility, then double voting, then candidate.
pub struct VoteValidator<'a> {
    ledger: &'a Ledger,
    voters: &'a VoterRoll,
    candidates: &'a CandidateRegistry,
}

impl<'a> VoteValidator<'a> {
    pub fn new(ledger: &'a Ledger, voters: &'a VoterRoll, candidates: &'a CandidateRegistry) -> Self {
        VoteValidator {
            ledger,
            voters,
            candidates,
        }
    }

    pub fn validate(&self, voter_id: i64, candidate: &str) -> Result<(), VoteError> {
        if !self.voters.is_eligible(voter_id) {
            return Err(VoteError::InvalidVoterId(voter_id));
        }
        if self.ledger.has_voted(voter_id) {
            return Err(VoteError::DuplicateVote(voter_id));
        }
        if !self.candidates.contains(candidate) {
            return Err(VoteError::UnknownCandidate(candidate.to_string()));
        }
        Ok(())
    }
}
