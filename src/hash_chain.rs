use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{Block, Vote};

// Field order here is the canonical order; changing it breaks every stored chain.
#[derive(Serialize)]
struct HashMaterial<'a> {
    previous_hash: &'a str,
    previous_votes: &'a [Vote],
    vote: &'a Vote,
}

/// Hash linking a new block to `previous`: SHA-256 over the canonical JSON of
/// `(previous.current_hash, previous.votes, vote)`, as lowercase hex.
pub fn compute_hash(previous: &Block, vote: &Vote) -> String {
    let material = HashMaterial {
        previous_hash: &previous.current_hash,
        previous_votes: &previous.votes,
        vote,
    };
    // Serializing plain strings and integers cannot fail.
    let json = serde_json::to_vec(&material).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&json);
    format!("{:x}", hasher.finalize())
}
