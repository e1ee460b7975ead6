//! Disk-backed cache for counseling round lookups.
//!
//! The one hot read path — all rows for an (exam, type, year, round)
//! tuple — is served from pre-serialized gzip snapshots on disk. Closed
//! historical rounds never change, so a written key is treated as
//! permanently correct; only a re-import of the batch invalidates it.
//!
//! Production nodes run on read-only or ephemeral filesystems and do not
//! accumulate local cache state, so cache files are only written outside
//! production. A miss there still serves the store result, marked as
//! short-lived for downstream HTTP caches.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, warn};

use crate::models::{CounselingProfile, CounselingType, Exam};
use crate::repository::{RepositoryError, ResultRepository};

/// Errors from cache lookups.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a lookup was satisfied.
///
/// Callers translate this into HTTP cache headers: hits are immutable
/// historical data and safe to cache indefinitely, misses may not have
/// been persisted and get a short lifetime, too-early answers are empty
/// by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    TooEarly,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::TooEarly => "too-early",
        }
    }
}

/// A lookup answer: gzip-compressed JSON array of result rows.
#[derive(Debug, Clone)]
pub struct CachedResults {
    pub body: Vec<u8>,
    pub status: CacheStatus,
}

/// Disk-backed, query-parameter-keyed result cache.
#[derive(Clone)]
pub struct ResultCache {
    dir: PathBuf,
    persist_writes: bool,
}

impl ResultCache {
    pub fn new(dir: &Path, persist_writes: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            persist_writes,
        }
    }

    /// Deterministic file name for one lookup tuple.
    pub fn key(exam: Exam, counseling_type: CounselingType, year: i32, round: i32) -> String {
        format!(
            "{}_{}_{}_{}.json.gz",
            exam.as_str(),
            counseling_type.as_str(),
            year,
            round
        )
    }

    fn key_path(&self, exam: Exam, counseling_type: CounselingType, year: i32, round: i32) -> PathBuf {
        self.dir.join(Self::key(exam, counseling_type, year, round))
    }

    /// Fetch all rows for a round, serving from disk when possible.
    ///
    /// Requests beyond the counseling type's latest published round
    /// short-circuit to an empty answer without touching disk or store.
    /// A corrupt cache file is logged and treated as a miss.
    pub fn lookup(
        &self,
        store: &ResultRepository,
        exam: Exam,
        counseling_type: CounselingType,
        year: i32,
        round: i32,
    ) -> Result<CachedResults, CacheError> {
        let profile = CounselingProfile::for_type(counseling_type);
        if profile.latest.is_beyond(year, round) {
            debug!(
                %year, %round, counseling_type = counseling_type.as_str(),
                "round beyond latest published marker"
            );
            return Ok(CachedResults {
                body: gzip(b"[]")?,
                status: CacheStatus::TooEarly,
            });
        }

        let path = self.key_path(exam, counseling_type, year, round);
        if let Some(body) = self.read_verified(&path) {
            return Ok(CachedResults {
                body,
                status: CacheStatus::Hit,
            });
        }

        let rows = store.get_round(exam, counseling_type, year, round)?;
        let body = gzip(&serde_json::to_vec(&rows)?)?;

        if self.persist_writes {
            if let Err(e) = self.write_key(&path, &body) {
                warn!("Failed to persist cache file {}: {}", path.display(), e);
            }
        }

        Ok(CachedResults {
            body,
            status: CacheStatus::Miss,
        })
    }

    /// Read a cache file and verify it decompresses; None on any failure.
    fn read_verified(&self, path: &Path) -> Option<Vec<u8>> {
        let bytes = fs::read(path).ok()?;
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut sink = Vec::new();
        match decoder.read_to_end(&mut sink) {
            Ok(_) => Some(bytes),
            Err(e) => {
                warn!(
                    "Corrupt cache file {}, falling back to store: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn write_key(&self, path: &Path, body: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, body)
    }

    /// Remove every round's key for one (exam, type, year) batch.
    ///
    /// Called by bulk re-import so replaced rows cannot be served from a
    /// stale snapshot. Returns the removed keys.
    pub fn invalidate_batch(
        &self,
        exam: Exam,
        counseling_type: CounselingType,
        year: i32,
    ) -> std::io::Result<Vec<String>> {
        let prefix = format!("{}_{}_{}_", exam.as_str(), counseling_type.as_str(), year);
        let mut removed = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                fs::remove_file(entry.path())?;
                removed.push(name);
            }
        }
        Ok(removed)
    }

    /// Number of cache files on disk and their total size in bytes.
    pub fn stats(&self) -> std::io::Result<(usize, u64)> {
        let mut files = 0usize;
        let mut bytes = 0u64;
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((0, 0)),
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files += 1;
                bytes += entry.metadata()?.len();
            }
        }
        Ok((files, bytes))
    }

    /// Remove every cache file.
    pub fn clear(&self) -> std::io::Result<usize> {
        let (files, _) = self.stats()?;
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(files)
    }
}

/// Gzip-compress a byte slice.
fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompress a gzip body produced by the cache.
pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollegeType, CounselingResult};
    use crate::repository::{init_schema, CollegeRepository, NewResult};
    use tempfile::tempdir;

    fn setup(persist: bool) -> (ResultCache, ResultRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        init_schema(&db_path).unwrap();
        let college = CollegeRepository::new(&db_path)
            .upsert_by_name("IIT Bombay", CollegeType::Iit)
            .unwrap();
        let store = ResultRepository::new(&db_path);
        store
            .bulk_insert(&[NewResult {
                year: 2024,
                round: 1,
                counseling_type: CounselingType::Jossa,
                exam: Exam::Advanced,
                college_id: college.id,
                institute: "IIT Bombay".to_string(),
                academic_program_name: "Computer Science".to_string(),
                quota: "AI".to_string(),
                seat_type: "OPEN".to_string(),
                gender: "Gender-Neutral".to_string(),
                open_rank: Some(1),
                close_rank: Some(66),
                marks: None,
            }])
            .unwrap();
        let cache = ResultCache::new(&dir.path().join("cache"), persist);
        (cache, store, dir)
    }

    #[test]
    fn test_miss_then_hit_byte_identical() {
        let (cache, store, _dir) = setup(true);
        let first = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        let second = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(first.body, second.body);

        let rows: Vec<CounselingResult> =
            serde_json::from_slice(&gunzip(&second.body).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close_rank, Some(66));
    }

    #[test]
    fn test_production_never_persists() {
        let (cache, store, _dir) = setup(false);
        let first = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        let second = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Miss);
        assert_eq!(cache.stats().unwrap().0, 0);
    }

    #[test]
    fn test_too_early_skips_store_and_disk() {
        let (cache, store, _dir) = setup(true);
        // JOSSA marker is 2025 round 5; 2026 round 1 is beyond it even
        // though the store has rows for earlier rounds.
        let out = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2026, 1)
            .unwrap();
        assert_eq!(out.status, CacheStatus::TooEarly);
        let rows: Vec<CounselingResult> =
            serde_json::from_slice(&gunzip(&out.body).unwrap()).unwrap();
        assert!(rows.is_empty());
        assert_eq!(cache.stats().unwrap().0, 0);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_store() {
        let (cache, store, dir) = setup(true);
        let key_path = dir
            .path()
            .join("cache")
            .join(ResultCache::key(Exam::Advanced, CounselingType::Jossa, 2024, 1));
        std::fs::create_dir_all(key_path.parent().unwrap()).unwrap();
        std::fs::write(&key_path, b"not gzip at all").unwrap();

        let out = cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(out.status, CacheStatus::Miss);
        let rows: Vec<CounselingResult> =
            serde_json::from_slice(&gunzip(&out.body).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_invalidate_batch_removes_all_rounds() {
        let (cache, store, _dir) = setup(true);
        cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        cache
            .lookup(&store, Exam::Advanced, CounselingType::Jossa, 2024, 2)
            .unwrap();
        assert_eq!(cache.stats().unwrap().0, 2);

        let removed = cache
            .invalidate_batch(Exam::Advanced, CounselingType::Jossa, 2024)
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(cache.stats().unwrap().0, 0);
    }
}
