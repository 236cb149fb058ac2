use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const KEY_PREFIX: &str = "swissorients:quizbest:";

/// Best result of a quiz mode: share solved cleanly and the time it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBest {
    pub percent: u32,
    pub time_sec: u64,
}

impl QuizBest {
    /// Higher percent wins; equal percent is decided by the shorter time.
    pub fn is_better_than(&self, other: &QuizBest) -> bool {
        self.percent > other.percent
            || (self.percent == other.percent && self.time_sec < other.time_sec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::StorageUnavailable => write!(f, "score storage unavailable"),
            ScoreError::Corrupt(msg) => write!(f, "score storage corrupt: {msg}"),
            ScoreError::Io(msg) => write!(f, "score storage error: {msg}"),
        }
    }
}

impl std::error::Error for ScoreError {}

/// String key-value storage holding one JSON value per quiz mode.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ScoreError>;
}

pub fn storage_key(mode_id: &str) -> String {
    format!("{KEY_PREFIX}{mode_id}")
}

/// Stored best of `mode_id`; missing, unreadable and corrupt entries all
/// read as `None`.
pub fn load_best(store: &dyn ScoreStore, mode_id: &str) -> Option<QuizBest> {
    let raw = match store.get(&storage_key(mode_id)) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(mode = mode_id, error = %err, "best score unreadable");
            return None;
        }
    };
    match serde_json::from_str::<QuizBest>(&raw) {
        Ok(best) => Some(best),
        Err(err) => {
            warn!(mode = mode_id, error = %err, "stored best score corrupt");
            None
        }
    }
}

/// Stores `next` when it strictly beats the stored best. Returns whether it
/// was written.
pub fn save_best_if_better(
    store: &mut dyn ScoreStore,
    mode_id: &str,
    next: QuizBest,
) -> Result<bool, ScoreError> {
    if let Some(prev) = load_best(store, mode_id)
        && !next.is_better_than(&prev)
    {
        return Ok(false);
    }
    let raw = serde_json::to_string(&next).map_err(|e| ScoreError::Io(e.to_string()))?;
    store.set(&storage_key(mode_id), &raw)?;
    debug!(mode = mode_id, percent = next.percent, time_sec = next.time_sec, "best score saved");
    Ok(true)
}

pub fn format_time_mmss(sec: u64) -> String {
    foundation::time::format_mmss(sec)
}

#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    entries: BTreeMap<String, String>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ScoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All entries in one JSON object file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileScoreStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileScoreStore {
    /// Opens `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| ScoreError::Corrupt(e.to_string()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(ScoreError::Io(format!("{}: {err}", path.display()))),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ScoreError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        let raw = serde_json::to_string_pretty(&next).map_err(|e| ScoreError::Io(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| ScoreError::Io(format!("{}: {e}", self.path.display())))?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{ScoreError, ScoreStore};

    /// Browser `localStorage`, keyed exactly like the web app.
    #[derive(Debug)]
    pub struct LocalStorageScoreStore {
        storage: web_sys::Storage,
    }

    impl LocalStorageScoreStore {
        pub fn new() -> Result<Self, ScoreError> {
            let win = web_sys::window().ok_or(ScoreError::StorageUnavailable)?;
            let storage = win
                .local_storage()
                .map_err(|e| ScoreError::Io(format!("localStorage error: {:?}", e)))?
                .ok_or(ScoreError::StorageUnavailable)?;
            Ok(Self { storage })
        }
    }

    impl ScoreStore for LocalStorageScoreStore {
        fn get(&self, key: &str) -> Result<Option<String>, ScoreError> {
            self.storage
                .get_item(key)
                .map_err(|e| ScoreError::Io(format!("get_item failed: {:?}", e)))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), ScoreError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| ScoreError::Io(format!("set_item failed: {:?}", e)))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageScoreStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageScoreStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageScoreStore {
    pub fn new() -> Result<Self, ScoreError> {
        Err(ScoreError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for LocalStorageScoreStore {
    fn get(&self, _key: &str) -> Result<Option<String>, ScoreError> {
        Err(ScoreError::StorageUnavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), ScoreError> {
        Err(ScoreError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryScoreStore, JsonFileScoreStore, LocalStorageScoreStore, QuizBest, ScoreError,
        ScoreStore, format_time_mmss, load_best, save_best_if_better, storage_key,
    };
    use pretty_assertions::assert_eq;

    fn best(percent: u32, time_sec: u64) -> QuizBest {
        QuizBest { percent, time_sec }
    }

    #[test]
    fn only_strict_improvements_are_written() {
        let mut store = InMemoryScoreStore::new();
        assert!(save_best_if_better(&mut store, "ch-cantons", best(80, 150)).unwrap());
        assert!(save_best_if_better(&mut store, "ch-cantons", best(80, 120)).unwrap());
        assert_eq!(load_best(&store, "ch-cantons"), Some(best(80, 120)));

        assert!(!save_best_if_better(&mut store, "ch-cantons", best(70, 50)).unwrap());
        assert!(!save_best_if_better(&mut store, "ch-cantons", best(80, 120)).unwrap());
        assert_eq!(load_best(&store, "ch-cantons"), Some(best(80, 120)));

        assert!(save_best_if_better(&mut store, "ch-cantons", best(90, 400)).unwrap());
    }

    #[test]
    fn stored_format_matches_the_web_app() {
        let mut store = InMemoryScoreStore::new();
        save_best_if_better(&mut store, "ch-districts-1", best(75, 42)).unwrap();
        assert_eq!(
            store.get("swissorients:quizbest:ch-districts-1").unwrap(),
            Some(r#"{"percent":75,"timeSec":42}"#.to_string())
        );
    }

    #[test]
    fn corrupt_entry_reads_as_missing() {
        let mut store = InMemoryScoreStore::new();
        store.set(&storage_key("ch-cantons"), "{not json").unwrap();
        assert_eq!(load_best(&store, "ch-cantons"), None);
        assert!(save_best_if_better(&mut store, "ch-cantons", best(10, 10)).unwrap());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        {
            let mut store = JsonFileScoreStore::open(&path).unwrap();
            save_best_if_better(&mut store, "ch-cantons", best(100, 61)).unwrap();
        }
        let store = JsonFileScoreStore::open(&path).unwrap();
        assert_eq!(load_best(&store, "ch-cantons"), Some(best(100, 61)));
        assert_eq!(load_best(&store, "ch-communities"), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            JsonFileScoreStore::open(&path),
            Err(ScoreError::Corrupt(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn local_storage_is_unavailable_natively() {
        assert!(matches!(
            LocalStorageScoreStore::new(),
            Err(ScoreError::StorageUnavailable)
        ));
        assert_eq!(load_best(&LocalStorageScoreStore, "ch-cantons"), None);
    }

    #[test]
    fn formats_time() {
        assert_eq!(format_time_mmss(125), "02:05");
    }
}
