use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_BIND: &str = "127.0.0.1:10040";
pub const DEFAULT_VOTERS: i64 = 10;
pub const DEFAULT_CANDIDATES: [&str; 2] = ["Candidate A", "Candidate B"];
pub const DEFAULT_PERSIST_RETRIES: u32 = 3;
/// Upper bound on the voter roll registered at startup.
pub const MAX_VOTERS: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    /// Voters `1..=voters` are registered at startup.
    pub voters: i64,
    pub candidates: Vec<String>,
    /// Where the chain is kept between runs; in-memory only when unset.
    pub ledger_path: Option<PathBuf>,
    pub persist_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: DEFAULT_BIND.to_string(),
            voters: DEFAULT_VOTERS,
            candidates: DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            ledger_path: None,
            persist_retries: DEFAULT_PERSIST_RETRIES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(bind) = lookup("VOTE_LEDGER_BIND") {
            config.bind = bind;
        }

        if let Some(value) = lookup("VOTE_LEDGER_VOTERS") {
            config.voters = match value.trim().parse::<i64>() {
                Ok(n) if (0..=MAX_VOTERS).contains(&n) => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "VOTE_LEDGER_VOTERS",
                        expected: "an integer between 0 and 1000000",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("VOTE_LEDGER_CANDIDATES") {
            config.candidates = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(path) = lookup("VOTE_LEDGER_PATH").filter(|p| !p.trim().is_empty()) {
            config.ledger_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("VOTE_LEDGER_PERSIST_RETRIES") {
            config.persist_retries = match value.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "VOTE_LEDGER_PERSIST_RETRIES",
                        expected: "a positive integer",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}
