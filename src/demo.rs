// Scripted election, replayed by `vote_ledger demo`.

use crate::election::Election;
use crate::error::VoteError;
use crate::tally::Outcome;

pub const CANDIDATES: [&str; 2] = ["Candidate A", "Candidate B"];
pub const VOTERS: i64 = 10;

/// Ballots in submission order, including double votes, an unknown candidate
/// and an unregistered voter.
pub const BALLOTS: [(i64, &str); 10] = [
    (1, "Candidate A"),
    (2, "Candidate B"),
    (3, "Candidate A"),
    (3, "Candidate B"),
    (4, "Candidate B"),
    (5, "Candidate A"),
    (5, "Candidate A"),
    (6, "Candidate B"),
    (7, "Candidate C"),
    (11, "Candidate B"),
];

/// Register the demo roll and cast every ballot. Returns the election and
/// the outcome of each ballot.
pub fn replay() -> Result<(Election, Vec<Result<(), VoteError>>), VoteError> {
    let mut election = Election::new();
    for name in CANDIDATES {
        election.register_candidate(name)?;
    }
    for voter_id in 1..=VOTERS {
        election.register_voter(voter_id)?;
        println!("Voter {} registered.", voter_id);
    }

    let mut outcomes = Vec::with_capacity(BALLOTS.len());
    for (voter_id, candidate) in BALLOTS {
        let outcome = election.cast_vote(voter_id, candidate).map(|_| ());
        match &outcome {
            Ok(()) => println!("Vote cast by Voter {} for {} is recorded.", voter_id, candidate),
            Err(err) => println!("Rejected: {}", err),
        }
        outcomes.push(outcome);
    }
    Ok((election, outcomes))
}

pub fn run() -> Result<(), VoteError> {
    let (election, _) = replay()?;

    println!("\nElection Results:");
    let results = election.results();
    for (candidate, votes) in &results.tally {
        println!("{}: {}", candidate, votes);
    }
    match &results.outcome {
        Outcome::Winner { candidate, votes } => println!("Winner: {} ({} votes)", candidate, votes),
        Outcome::Tie { candidates, votes } => {
            println!("Election resulted in a tie at {} votes: {}", votes, candidates.join(", "))
        }
    }

    println!("\nBlockchain:");
    for (i, block) in election.ledger_snapshot().iter().enumerate() {
        println!("Block {}", i);
        println!("PrevHash: {}", block.previous_hash);
        println!("CurrentHash: {}", block.current_hash);
        println!("Votes: {:?}\n", block.votes);
    }

    election.verify_integrity()?;
    println!("Ledger integrity verified.");
    Ok(())
}
