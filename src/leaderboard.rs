//! Leaderboard
//!
//! Top-N best distances, persisted as a JSON array of `{distance, date}`
//! records through a plain string key-value store. The simulation never
//! touches storage; the host submits the final score on game over and reads
//! the board back on the menu.
//!
//! Loading is forgiving: missing, unreadable or malformed data is an empty
//! board, never an error.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{info, warn};

/// Entries kept by default.
pub const DEFAULT_CAPACITY: usize = 5;

/// Store key the board lives under.
pub const STORAGE_KEY: &str = "neon_runner_leaderboard";

/// Leaderboard errors.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Store could not be read or written.
    #[error("Leaderboard store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Board could not be encoded.
    #[error("Leaderboard encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// STORES
// =============================================================================

/// String key-value persistence.
pub trait LeaderboardStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError>;
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LeaderboardStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// =============================================================================
// LEADERBOARD
// =============================================================================

/// One finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Final score (metres)
    pub distance: u32,
    /// When the run ended
    pub date: DateTime<Utc>,
}

/// Best runs, distance descending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Leaderboard {
    /// Empty board keeping at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Load from a store. Never fails: bad data yields an empty board.
    pub fn load(store: &impl LeaderboardStore, capacity: usize) -> Self {
        let mut board = Self::with_capacity(capacity);

        let raw = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return board,
            Err(e) => {
                warn!(error = %e, "leaderboard unreadable, starting empty");
                return board;
            }
        };

        match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
            Ok(entries) => {
                for entry in entries {
                    board.insert(entry);
                }
            }
            Err(e) => warn!(error = %e, "leaderboard malformed, starting empty"),
        }
        board
    }

    /// Save to a store.
    pub fn save(&self, store: &mut impl LeaderboardStore) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string(&self.entries)?;
        store.set(STORAGE_KEY, &json)
    }

    /// Insert a run. Returns its rank (0 = best) if it made the board.
    ///
    /// Ties keep the earlier entry ahead.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|e| e.distance < entry.distance)
            .unwrap_or(self.entries.len());
        if rank >= self.capacity {
            return None;
        }
        self.entries.insert(rank, entry);
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    /// Record a finished run now and persist the board.
    pub fn submit(
        &mut self,
        distance: u32,
        store: &mut impl LeaderboardStore,
    ) -> Result<Option<usize>, LeaderboardError> {
        let rank = self.insert(LeaderboardEntry { distance, date: Utc::now() });
        if let Some(rank) = rank {
            info!(distance, rank, "new leaderboard entry");
            self.save(store)?;
        }
        Ok(rank)
    }

    /// Entries, best first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Best distance so far.
    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.distance)
    }

    /// Maximum entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// No runs recorded?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
