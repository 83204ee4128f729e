use std::sync::OnceLock;

use log::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{IntegrityViolation, VoteError};
use crate::ledger::Ledger;
use crate::models::{Block, HistoryEntry, Vote};
use crate::registry::{CandidateRegistry, VoterRoll};
use crate::store::{save_with_retry, JsonFileStore, LedgerStore};
use crate::tally::{self, ElectionResults};
use crate::validator::VoteValidator;

/// Owns the ledger and registries and runs the validate-then-append pipeline.
///
/// Writes take `&mut self`, so a caller sharing an `Election` across tasks must
/// hold an exclusive lock for the whole of `cast_vote`.
pub struct Election {
    ledger: Ledger,
    voters: VoterRoll,
    candidates: CandidateRegistry,
    store: Option<Box<dyn LedgerStore>>,
    persist_retries: u32,
    halted: OnceLock<IntegrityViolation>,
}

impl Election {
    pub fn new() -> Self {
        Election {
            ledger: Ledger::new(),
            voters: VoterRoll::new(),
            candidates: CandidateRegistry::new(),
            store: None,
            persist_retries: 1,
            halted: OnceLock::new(),
        }
    }

    /// Resume from whatever `store` holds. A stored chain that fails
    /// verification is kept for audit but the election starts halted.
    pub fn with_store(store: Box<dyn LedgerStore>, persist_retries: u32) -> Result<Self, VoteError> {
        let blocks = store
            .load()
            .map_err(VoteError::Load)?;

        let mut election = Election::new();
        if let Some(blocks) = blocks {
            info!("loaded {} block(s) from store", blocks.len());
            election.ledger = Ledger::from_blocks(blocks);
        }
        election.store = Some(store);
        election.persist_retries = persist_retries.max(1);

        if election.verify_integrity().is_err() {
            warn!("stored ledger failed verification; writes are disabled");
        }
        Ok(election)
    }

    pub fn from_config(config: &Config) -> Result<Self, VoteError> {
        let mut election = match &config.ledger_path {
            Some(path) => {
                let store = JsonFileStore::new(path);
                info!("using ledger file {}", store.path().display());
                Election::with_store(Box::new(store), config.persist_retries)?
            }
            None => Election::new(),
        };

        for voter_id in 1..=config.voters {
            election.register_voter(voter_id)?;
        }
        for name in &config.candidates {
            election.register_candidate(name.as_str())?;
        }
        Ok(election)
    }

    pub fn register_voter(&mut self, voter_id: i64) -> Result<(), VoteError> {
        self.voters.register(voter_id)?;
        debug!("voter {} registered", voter_id);
        Ok(())
    }

    pub fn register_candidate(&mut self, name: impl Into<String>) -> Result<(), VoteError> {
        let name = name.into();
        self.candidates.register(name.clone())?;
        debug!("candidate {:?} registered", name);
        Ok(())
    }

    pub fn cast_vote(&mut self, voter_id: i64, candidate: &str) -> Result<&Block, VoteError> {
        if let Some(violation) = self.halted.get() {
            return Err(violation.clone().into());
        }

        let validator = VoteValidator::new(&self.ledger, &self.voters, &self.candidates);
        if let Err(err) = validator.validate(voter_id, candidate) {
            warn!("vote rejected: {}", err);
            return Err(err);
        }

        let block = self.ledger.next_block(&Vote::new(voter_id, candidate));
        if let Some(store) = self.store.as_mut() {
            let mut chain = Vec::with_capacity(self.ledger.len() + 1);
            chain.extend_from_slice(self.ledger.blocks());
            chain.push(block.clone());
            save_with_retry(store.as_mut(), &chain, self.persist_retries)?;
        }

        let block = self.ledger.commit(block);
        info!("vote cast by voter {} for {} is recorded", voter_id, candidate);
        Ok(block)
    }

    pub fn results(&self) -> ElectionResults {
        tally::results(&self.ledger, &self.candidates)
    }

    pub fn ledger_snapshot(&self) -> &[Block] {
        self.ledger.blocks()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.ledger.history()
    }

    /// Verify the whole chain. The first failure halts all further votes.
    pub fn verify_integrity(&self) -> Result<(), IntegrityViolation> {
        self.ledger.verify_integrity().map_err(|violation| {
            error!("{}", violation);
            let _ = self.halted.set(violation.clone());
            violation
        })
    }

    pub fn halted(&self) -> Option<&IntegrityViolation> {
        self.halted.get()
    }

    pub fn voters(&self) -> &VoterRoll {
        &self.voters
    }

    pub fn candidates(&self) -> &CandidateRegistry {
        &self.candidates
    }
}

impl Default for Election {
    fn default() -> Self {
        Self::new()
    }
}
