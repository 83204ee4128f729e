// Append-only, hash-linked vote ledger.
// Admission policy lives in `validator`; this module only maintains the chain.

use crate::error::IntegrityViolation;
use crate::hash_chain::compute_hash;
use crate::models::{Block, HistoryEntry, Vote};

#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            blocks: vec![Block::genesis()],
        }
    }

    /// Adopt a previously stored chain. An empty list yields a fresh ledger.
    /// The result is not verified; call `verify_integrity` before trusting it.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::new();
        }
        Ledger { blocks }
    }

    pub fn tip(&self) -> &Block {
        // Never empty: constructed with genesis, only ever pushed to.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when only genesis is present.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block that `append(vote)` would push, without pushing it.
    pub fn next_block(&self, vote: &Vote) -> Block {
        let previous = self.tip();
        let mut votes = Vec::with_capacity(previous.votes.len() + 1);
        votes.extend_from_slice(&previous.votes);
        votes.push(vote.clone());
        Block {
            previous_hash: previous.current_hash.clone(),
            current_hash: compute_hash(previous, vote),
            votes,
        }
    }

    /// Append an already validated vote.
    pub fn append(&mut self, vote: Vote) -> &Block {
        let block = self.next_block(&vote);
        self.commit(block)
    }

    /// Push a block produced by `next_block` against the current tip.
    pub(crate) fn commit(&mut self, block: Block) -> &Block {
        debug_assert_eq!(block.previous_hash, self.tip().current_hash);
        self.blocks.push(block);
        self.tip()
    }

    /// Linear scan of the cumulative history held by the tip.
    /// This is where a voter index would go if the roll grows large.
    pub fn has_voted(&self, voter_id: i64) -> bool {
        self.tip().votes.iter().any(|v| v.voter_id == voter_id)
    }

    /// Every accepted vote in admission order.
    pub fn votes(&self) -> &[Vote] {
        &self.tip().votes
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.blocks
            .iter()
            .skip(1)
            .filter_map(|block| {
                block.admitted_vote().map(|vote| HistoryEntry {
                    voter_id: vote.voter_id,
                    candidate: vote.candidate.clone(),
                    block_hash: block.current_hash.clone(),
                })
            })
            .collect()
    }

    /// Walk the chain once, stopping at the first block that does not follow
    /// from its predecessor.
    pub fn verify_integrity(&self) -> Result<(), IntegrityViolation> {
        let violation = |index: usize, reason: &str| IntegrityViolation {
            index,
            reason: reason.to_string(),
        };

        match self.blocks.first() {
            Some(genesis) if genesis.is_genesis() => {}
            _ => return Err(violation(0, "malformed genesis block")),
        }

        for (index, pair) in self.blocks.windows(2).enumerate() {
            let index = index + 1;
            let (previous, block) = (&pair[0], &pair[1]);

            if block.previous_hash != previous.current_hash {
                return Err(violation(index, "previous hash does not match predecessor"));
            }
            if block.votes.len() != previous.votes.len() + 1
                || block.votes[..previous.votes.len()] != previous.votes[..]
            {
                return Err(violation(index, "vote history diverges from predecessor"));
            }
            let vote = &block.votes[previous.votes.len()];
            if previous.votes.iter().any(|v| v.voter_id == vote.voter_id) {
                return Err(violation(index, "voter appears more than once"));
            }
            if block.current_hash != compute_hash(previous, vote) {
                return Err(violation(index, "current hash does not match contents"));
            }
        }

        Ok(())
    }

    pub fn is_intact(&self) -> bool {
        self.verify_integrity().is_ok()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
