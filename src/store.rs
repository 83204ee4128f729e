use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::VoteError;
use crate::models::Block;

/// Durable home for the chain. Implementations replace the whole chain on save.
pub trait LedgerStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> io::Result<Option<Vec<Block>>>;

    fn save(&mut self, blocks: &[Block]) -> io::Result<()>;
}

/// Pretty-printed JSON file. Saves go to a sibling `.tmp` file that is then
/// renamed over the target, so a failed save never touches the stored chain.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> io::Result<Option<Vec<Block>>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let blocks: Vec<Block> = serde_json::from_str(&contents)?;
        Ok(Some(blocks))
    }

    fn save(&mut self, blocks: &[Block]) -> io::Result<()> {
        let blocks_json = serde_json::to_string_pretty(blocks)?;
        let temp_path = self.temp_path();

        {
            let mut file = OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(&temp_path)?;
            write!(file, "{}", blocks_json)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.path)
    }
}

/// In-memory store with injectable save failures.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    blocks: Option<Vec<Block>>,
    failures_left: u32,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        MemoryStore {
            blocks: Some(blocks),
            failures_left: 0,
        }
    }

    /// Make the next `count` saves fail.
    pub fn fail_next(&mut self, count: u32) {
        self.failures_left = count;
    }

    pub fn stored(&self) -> Option<&[Block]> {
        self.blocks.as_deref()
    }
}

#[cfg(test)]
impl LedgerStore for MemoryStore {
    fn load(&self) -> io::Result<Option<Vec<Block>>> {
        Ok(self.blocks.clone())
    }

    fn save(&mut self, blocks: &[Block]) -> io::Result<()> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(io::Error::new(io::ErrorKind::Other, "injected store failure"));
        }
        self.blocks = Some(blocks.to_vec());
        Ok(())
    }
}

/// Try `save` up to `attempts` times (at least once).
pub fn save_with_retry(store: &mut dyn LedgerStore, blocks: &[Block], attempts: u32) -> Result<(), VoteError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.save(blocks) {
            Ok(()) => return Ok(()),
            Err(source) if attempt >= attempts => {
                return Err(VoteError::Persistence { attempts, source });
            }
            Err(err) => {
                warn!("ledger save attempt {}/{} failed: {}", attempt, attempts, err);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::models::Vote;
    use tempfile::TempDir;

    fn two_vote_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.append(Vote::new(1, "Candidate A"));
        ledger.append(Vote::new(2, "Candidate B"));
        ledger
    }

    #[test]
    fn json_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let ledger = two_vote_ledger();

        let mut store = JsonFileStore::new(dir.path().join("blocks.json"));
        store.save(ledger.blocks()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, ledger.blocks());
        assert!(Ledger::from_blocks(loaded).is_intact());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("blocks.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocks.json");
        fs::write(&path, "not json").unwrap();
        assert!(JsonFileStore::new(&path).load().is_err());
    }

    #[test]
    fn failed_save_keeps_previous_chain() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("blocks.json"));
        let ledger = two_vote_ledger();
        store.save(&ledger.blocks()[..2]).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(store.temp_path()).unwrap();
        assert!(store.save(ledger.blocks()).is_err());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, &ledger.blocks()[..2]);
    }

    #[test]
    fn torn_temp_file_is_ignored_and_replaced() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("blocks.json"));
        let ledger = two_vote_ledger();
        store.save(&ledger.blocks()[..2]).unwrap();

        let full = serde_json::to_string_pretty(ledger.blocks()).unwrap();
        fs::write(store.temp_path(), &full[..full.len() / 2]).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), &ledger.blocks()[..2]);

        store.save(ledger.blocks()).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), ledger.blocks());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn retry_recovers_from_transient_failure() {
        let mut store = MemoryStore::new();
        store.fail_next(2);
        let blocks = vec![Block::genesis()];
        save_with_retry(&mut store, &blocks, 3).unwrap();
        assert_eq!(store.stored(), Some(&blocks[..]));
    }

    #[test]
    fn retry_gives_up_after_bound() {
        let mut store = MemoryStore::new();
        store.fail_next(5);
        let err = save_with_retry(&mut store, &[Block::genesis()], 3).unwrap_err();
        assert!(matches!(err, VoteError::Persistence { attempts: 3, .. }));
        assert!(store.stored().is_none());
    }
}
