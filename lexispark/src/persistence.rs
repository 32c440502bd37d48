//! Saved client progress
//!
//! Each puzzle gets two small JSON files in the store directory: the full
//! session snapshot and a progress summary cheap enough to read for every
//! entry of a category listing. Both may carry an expiry; an expired file is
//! deleted on read. Writes go through a temporary file in the same directory
//! and are renamed into place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use lexispark_core::{BlobHash, PuzzleRef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::Result;

const STATE_PREFIX: &str = "lexispark_game_state";
const PROGRESS_PREFIX: &str = "lexispark_game_progress";

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Display form per slot, `null` while unfound
    pub guessed_words: Vec<Option<String>>,
    #[serde(with = "ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,
    /// Hex SHA-256 of the blob the session was played against
    pub bloom_filter_hash: String,
    #[serde(with = "ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// Summary written next to the snapshot
    pub fn progress(&self) -> Progress {
        Progress {
            completed_words: self.guessed_words.iter().flatten().count(),
            total_words: self.guessed_words.len(),
            last_updated: self.last_updated,
            expires_at: self.expires_at,
        }
    }
}

/// Found/total counts for one puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_words: usize,
    pub total_words: usize,
    #[serde(with = "ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Trait for records that may expire
trait Expiring {
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |at| at > now)
    }
}

impl Expiring for SessionSnapshot {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl Expiring for Progress {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// Directory of saved sessions, keyed by puzzle reference
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self, puzzle: &PuzzleRef) -> PathBuf {
        self.dir.join(format!("{STATE_PREFIX}_{puzzle}.json"))
    }

    pub fn progress_path(&self, puzzle: &PuzzleRef) -> PathBuf {
        self.dir.join(format!("{PROGRESS_PREFIX}_{puzzle}.json"))
    }

    /// Save a snapshot and its progress summary
    pub fn save(&self, puzzle: &PuzzleRef, snapshot: &SessionSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_json(&self.state_path(puzzle), snapshot)?;
        write_json(&self.progress_path(puzzle), &snapshot.progress())?;
        log::debug!("store: saved {} to {}", puzzle, self.dir.display());
        Ok(())
    }

    /// Load a snapshot taken against the blob with hash `blob_hash`
    ///
    /// Missing, expired and mismatched snapshots all yield `None`; an expired
    /// one is also removed.
    pub fn load(
        &self,
        puzzle: &PuzzleRef,
        blob_hash: &BlobHash,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionSnapshot>> {
        let path = self.state_path(puzzle);
        let snapshot: SessionSnapshot = match read_live(&path, now)? {
            Some(snapshot) => snapshot,
            None => return Ok(None),
        };

        if snapshot.bloom_filter_hash != blob_hash.to_string() {
            log::info!("store: {} was saved against another filter, ignoring", puzzle);
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    /// Progress summary, if present and not expired
    pub fn progress(&self, puzzle: &PuzzleRef, now: DateTime<Utc>) -> Result<Option<Progress>> {
        read_live(&self.progress_path(puzzle), now)
    }

    /// Forget a puzzle
    pub fn clear(&self, puzzle: &PuzzleRef) -> Result<()> {
        remove_if_present(&self.state_path(puzzle))?;
        remove_if_present(&self.progress_path(puzzle))?;
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_live<T: DeserializeOwned + Expiring>(path: &Path, now: DateTime<Utc>) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let record: T = serde_json::from_reader(BufReader::new(file))?;

    if !record.is_live(now) {
        log::debug!("store: {} expired", path.display());
        remove_if_present(path)?;
        return Ok(None);
    }
    Ok(Some(record))
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn hash() -> BlobHash {
        BlobHash::of(b"blob")
    }

    fn snapshot(expires_at: Option<DateTime<Utc>>) -> SessionSnapshot {
        SessionSnapshot {
            guessed_words: vec![None, Some("cat".into()), None],
            start_time: now() - Duration::minutes(3),
            end_time: None,
            bloom_filter_hash: hash().to_string(),
            last_updated: now(),
            expires_at,
        }
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(snapshot(None)).unwrap();
        assert_eq!(value["guessedWords"], json!([null, "cat", null]));
        assert_eq!(value["startTime"], json!(1709639820000i64));
        assert_eq!(value["endTime"], json!(null));
        assert!(value.get("expiresAt").is_none());
    }

    #[test]
    fn test_save_load_and_progress() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let puzzle = PuzzleRef::Id(12);
        store.save(&puzzle, &snapshot(None)).unwrap();

        assert!(store.state_path(&puzzle).ends_with("lexispark_game_state_12.json"));
        assert_eq!(store.load(&puzzle, &hash(), now()).unwrap(), Some(snapshot(None)));

        let progress = store.progress(&puzzle, now()).unwrap().unwrap();
        assert_eq!((progress.completed_words, progress.total_words), (1, 3));
    }

    #[test]
    fn test_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("not-yet-created"));
        assert_eq!(store.load(&PuzzleRef::Daily, &hash(), now()).unwrap(), None);
        assert_eq!(store.progress(&PuzzleRef::Daily, now()).unwrap(), None);
        store.clear(&PuzzleRef::Daily).unwrap();
    }

    #[test]
    fn test_hash_mismatch_is_ignored() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&PuzzleRef::Daily, &snapshot(None)).unwrap();

        let other = BlobHash::of(b"another blob");
        assert_eq!(store.load(&PuzzleRef::Daily, &other, now()).unwrap(), None);
        // still there for the matching blob
        assert!(store.load(&PuzzleRef::Daily, &hash(), now()).unwrap().is_some());
    }

    #[test]
    fn test_expired_state_is_removed() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let puzzle = PuzzleRef::HiddenDaily;
        let midnight = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();
        store.save(&puzzle, &snapshot(Some(midnight))).unwrap();

        assert!(store.load(&puzzle, &hash(), now()).unwrap().is_some());
        assert_eq!(store.load(&puzzle, &hash(), midnight).unwrap(), None);
        assert!(!store.state_path(&puzzle).exists());

        assert_eq!(store.progress(&puzzle, midnight).unwrap(), None);
        assert!(!store.progress_path(&puzzle).exists());
    }

    #[test]
    fn test_clear_removes_both_files() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&PuzzleRef::Id(3), &snapshot(None)).unwrap();
        store.clear(&PuzzleRef::Id(3)).unwrap();
        assert!(!store.state_path(&PuzzleRef::Id(3)).exists());
        assert!(!store.progress_path(&PuzzleRef::Id(3)).exists());
    }
}
