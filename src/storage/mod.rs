//! # Storage Module - Player File Persistence
//!
//! [`PlayerStore`] keeps the whole player collection in a single JSON file.
//! The file is read wholesale when a registry opens and rewritten wholesale on
//! every mutation.
//!
//! ## File Format
//!
//! A pretty-printed JSON array, records in registry order:
//!
//! ```json
//! [
//!   {
//!     "id": 1,
//!     "nick": "Nick",
//!     "points": 0,
//!     "online": true
//!   }
//! ]
//! ```
//!
//! ## Write Strategy
//!
//! Rewrites never touch the live file in place. The new content goes to a temp
//! file in the same directory, is fsynced, and then renamed over the target, so
//! a reader sees either the old array or the new one. When locking is enabled
//! an exclusive advisory lock on a sidecar `<file>.lock` is held for the whole
//! rewrite. The sidecar is created on the first save and left in place
//! afterwards (for `data.json` that is `data.json.lock`); it is always empty
//! and safe to delete while no registry is running. Set `storage.lock = false`
//! to skip it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use playerbase::storage::PlayerStore;
//! use playerbase::player::Player;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = PlayerStore::new("data.json");
//!     store.save(&[Player::new(1, "Nick")]).await?;
//!     let players = store.load().await?;
//!     assert_eq!(players.len(), 1);
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::{debug, trace};
use tokio::fs;

use crate::config::StorageConfig;
use crate::errors::StoreError;
use crate::player::Player;

/// Temp-name candidates tried before a rewrite gives up.
const MAX_TEMP_ATTEMPTS: u32 = 1000;

/// JSON file persistence for the full player collection.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    path: PathBuf,
    lock: bool,
}

impl PlayerStore {
    /// Store backed by `path`, with rewrite locking enabled.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: true,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            path: PathBuf::from(&config.data_file),
            lock: config.lock,
        }
    }

    /// Enable or disable the advisory lock taken around each rewrite.
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from the data file, in file order.
    ///
    /// Fails with a load error when the file is missing or malformed, and with
    /// [`StoreError::DuplicateRecords`] when two records share an id.
    pub async fn load(&self) -> Result<Vec<Player>, StoreError> {
        let data = fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        // Guard against any accidental leading NULs
        let cleaned = data.trim_start_matches('\0');
        let players: Vec<Player> =
            serde_json::from_str(cleaned).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut seen = HashSet::with_capacity(players.len());
        if !players.iter().all(|p| seen.insert(p.id)) {
            return Err(StoreError::DuplicateRecords);
        }

        debug!("Loaded {} players from {}", players.len(), self.path.display());
        Ok(players)
    }

    /// Replace the data file with `players`, pretty-printed.
    pub async fn save(&self, players: &[Player]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(players)?;
        self.write_file_locked(&content).map_err(|source| StoreError::Save {
            path: self.path.clone(),
            source,
        })?;
        trace!("Saved {} players to {}", players.len(), self.path.display());
        Ok(())
    }

    /// Atomic replace of the data file with `content`.
    fn write_file_locked(&self, content: &str) -> std::io::Result<()> {
        use std::fs::{self, File, OpenOptions};
        use std::io::Write;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let base = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("data.json");

        // Step 1: Acquire the sidecar lock so concurrent writers serialize
        let lock_file = if self.lock {
            let f = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(dir.join(format!("{}.lock", base)))?;
            f.lock_exclusive()?;
            Some(f)
        } else {
            None
        };

        // Step 2: Create a unique temp file next to the target and fsync it
        let mut tmp_path = None;
        for counter in 0..MAX_TEMP_ATTEMPTS {
            let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut tmp) => {
                    let written = tmp
                        .write_all(content.as_bytes())
                        .and_then(|_| tmp.flush())
                        .and_then(|_| tmp.sync_all());
                    if let Err(e) = written {
                        drop(tmp);
                        let _ = fs::remove_file(&candidate);
                        return Err(e);
                    }
                    tmp_path = Some(candidate);
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        let tmp_path = tmp_path.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("no free temp file name after {} attempts", MAX_TEMP_ATTEMPTS),
            )
        })?;

        // Step 3: Atomically replace the destination with the temp file
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        // Step 4: Fsync the directory to persist the rename (best-effort)
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }

        // Step 5: Unlock
        if let Some(f) = lock_file {
            let _ = f.unlock();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        let players = vec![
            Player::with_state(3, "C", 30, true),
            Player::with_state(1, "A", 10, false),
            Player::with_state(2, "B", 0, true),
        ];
        store.save(&players).await.unwrap();
        assert_eq!(store.load().await.unwrap(), players);
    }

    #[tokio::test]
    async fn save_is_pretty_printed() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        store.save(&[Player::new(1, "Nick")]).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n"));
        assert!(raw.contains("\"nick\": \"Nick\""));
    }

    #[tokio::test]
    async fn save_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        store.save(&[Player::new(1, "Nick")]).await.unwrap();
        store.save(&[]).await.unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
        // The empty lock sidecar is kept between saves
        let lock = tmp.path().join("data.json.lock");
        assert!(lock.is_file());
        assert_eq!(std::fs::metadata(&lock).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unlocked_store_writes_no_sidecar() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json")).with_lock(false);
        store.save(&[]).await.unwrap();
        assert!(!tmp.path().join("data.json.lock").exists());
    }

    fn temp_leftovers(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .count()
    }

    #[tokio::test]
    async fn exhausted_temp_names_fail_without_touching_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        let good = vec![Player::with_state(1, "Keep", 10, true)];
        store.save(&good).await.unwrap();
        for n in 0..MAX_TEMP_ATTEMPTS {
            let name = format!(".data.json.tmp-{}-{}", std::process::id(), n);
            std::fs::write(tmp.path().join(name), "").unwrap();
        }

        let err = store.save(&[]).await.unwrap_err();

        assert!(matches!(err, StoreError::Save { .. }));
        assert_eq!(err.kind(), crate::errors::ErrorKind::Save);
        assert_eq!(store.load().await.unwrap(), good);
        // Only the pre-existing names are present; nothing new was left behind
        assert_eq!(temp_leftovers(tmp.path()), MAX_TEMP_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        let good = vec![Player::new(1, "A"), Player::new(2, "B")];
        store.save(&good).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        // A directory in place of the lock sidecar makes the rewrite fail, even as root
        let lock = tmp.path().join("data.json.lock");
        std::fs::remove_file(&lock).unwrap();
        std::fs::create_dir(&lock).unwrap();
        std::fs::write(lock.join("occupied"), "x").unwrap();

        let err = store.save(&[Player::new(3, "C")]).await.unwrap_err();

        assert!(matches!(err, StoreError::Save { .. }));
        assert!(err.to_string().starts_with("File saving error"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.load().await.unwrap(), good);
        assert_eq!(temp_leftovers(tmp.path()), 0);
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();
        let store = PlayerStore::new(&path).with_lock(false);

        let err = store.save(&[Player::new(1, "A")]).await.unwrap_err();

        assert!(matches!(err, StoreError::Save { .. }));
        assert_eq!(temp_leftovers(tmp.path()), 0);
        assert!(path.join("occupied").is_file());
    }

    #[tokio::test]
    async fn save_creates_missing_parent_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("nested").join("data.json")).with_lock(false);
        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_load_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("absent.json"));
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn malformed_file_is_a_load_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = PlayerStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn leading_nuls_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.json");
        std::fs::write(&path, "\0\0[]").unwrap();
        assert!(PlayerStore::new(&path).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = PlayerStore::new(tmp.path().join("data.json"));
        store
            .save(&[
                Player::with_state(1, "Nick", 100, true),
                Player::with_state(2, "Nick", 200, false),
                Player::with_state(1, "Nick1", 300, false),
            ])
            .await
            .unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRecords));
        assert_eq!(err.to_string(), "JSON file contains duplicates!");
    }
}
