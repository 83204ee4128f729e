// Single-node, hash-chained, append-only vote ledger.

pub mod config;
pub mod demo;
pub mod election;
pub mod error;
pub mod hash_chain;
pub mod http;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod store;
pub mod tally;
pub mod validator;

pub use election::Election;
pub use error::{IntegrityViolation, VoteError};
pub use models::{Block, Vote};
pub use tally::{ElectionResults, Outcome, Tally};
