//! High-score persistence port
//!
//! The session only needs one number to survive between visits. Backends:
//! - `MemoryStore` for tests and headless runs
//! - `JsonFileStore` for the native binary
//! - `LocalStorageStore` in the browser (plain integer string, same key the
//!   site has always used)

#[cfg(not(target_arch = "wasm32"))]
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Two-method storage contract for the best score.
///
/// A missing value is not an error; it reads as zero.
pub trait HighScoreStore {
    fn get_high_score(&self) -> Result<u64, GameError>;
    fn set_high_score(&mut self, score: u64) -> Result<(), GameError>;
}

/// The store a host gets when it has no preference: `LocalStorageStore` in
/// the browser, an empty `MemoryStore` elsewhere.
pub fn default_store() -> Box<dyn HighScoreStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(MemoryStore::new())
    }
}

/// In-memory store, optionally rigged to fail
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u64,
    fail_reads: bool,
    fail_writes: bool,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing best score
    pub fn with_score(value: u64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// A store whose every call fails as if storage were blocked
    pub fn unavailable() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store that reads fine but rejects writes (quota exceeded)
    pub fn read_only(value: u64) -> Self {
        Self {
            value,
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Number of successful writes
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl HighScoreStore for MemoryStore {
    fn get_high_score(&self) -> Result<u64, GameError> {
        if self.fail_reads {
            return Err(GameError::StorageUnavailable {
                reason: "memory store configured to fail".into(),
            });
        }
        Ok(self.value)
    }

    fn set_high_score(&mut self, score: u64) -> Result<(), GameError> {
        if self.fail_writes {
            return Err(GameError::StorageUnavailable {
                reason: "memory store is read-only".into(),
            });
        }
        self.value = score;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

/// High score kept in a small JSON file
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HighScoreStore for JsonFileStore {
    fn get_high_score(&self) -> Result<u64, GameError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let file: HighScoreFile =
            serde_json::from_str(&json).map_err(|e| GameError::StorageCorrupt {
                reason: e.to_string(),
            })?;
        Ok(file.high_score)
    }

    fn set_high_score(&mut self, score: u64) -> Result<(), GameError> {
        let json = serde_json::to_string(&HighScoreFile { high_score: score }).map_err(|e| {
            GameError::StorageUnavailable {
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Browser LocalStorage backend.
///
/// Handed out by [`default_store`] on wasm; the host page passes it to
/// `Session::new`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "brickBreaker_highScore";

    fn storage() -> Result<web_sys::Storage, GameError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| GameError::StorageUnavailable {
                reason: "localStorage is not accessible".into(),
            })
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn get_high_score(&self) -> Result<u64, GameError> {
        let storage = Self::storage()?;
        let value = storage
            .get_item(Self::STORAGE_KEY)
            .map_err(|_| GameError::StorageUnavailable {
                reason: "getItem failed".into(),
            })?;
        match value {
            None => Ok(0),
            Some(text) => parse_stored_score(&text),
        }
    }

    fn set_high_score(&mut self, score: u64) -> Result<(), GameError> {
        Self::storage()?
            .set_item(Self::STORAGE_KEY, &score.to_string())
            .map_err(|_| GameError::StorageUnavailable {
                reason: "setItem failed".into(),
            })
    }
}

/// Parse a stored high score written as a plain integer string
pub fn parse_stored_score(text: &str) -> Result<u64, GameError> {
    text.trim()
        .parse::<u64>()
        .map_err(|e| GameError::StorageCorrupt {
            reason: format!("{text:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_high_score().unwrap(), 0);
        store.set_high_score(420).unwrap();
        assert_eq!(store.get_high_score().unwrap(), 420);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_default_store_starts_empty() {
        let mut store = default_store();
        assert_eq!(store.get_high_score().unwrap(), 0);
        store.set_high_score(3).unwrap();
        assert_eq!(store.get_high_score().unwrap(), 3);
    }

    #[test]
    fn test_unavailable_store_errors() {
        let mut store = MemoryStore::unavailable();
        assert!(matches!(
            store.get_high_score(),
            Err(GameError::StorageUnavailable { .. })
        ));
        assert!(store.set_high_score(1).is_err());
    }

    #[test]
    fn test_parse_stored_score() {
        assert_eq!(parse_stored_score("1200").unwrap(), 1200);
        assert_eq!(parse_stored_score(" 7\n").unwrap(), 7);
        assert!(matches!(
            parse_stored_score("NaN"),
            Err(GameError::StorageCorrupt { .. })
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_store() {
        let path = std::env::temp_dir().join(format!(
            "retro-breaker-hs-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get_high_score().unwrap(), 0);
        store.set_high_score(990).unwrap();
        assert_eq!(JsonFileStore::new(&path).get_high_score().unwrap(), 990);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            store.get_high_score(),
            Err(GameError::StorageCorrupt { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }
}
