//! Counseling result repository for SQLite persistence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Row};
use tracing::debug;

use super::{connect, parse_datetime, Result};
use crate::models::{CounselingResult, CounselingType, Exam};

/// Rows are inserted in chunks of this size during bulk import, inside
/// one transaction per chunk, to keep single statements bounded.
const IMPORT_CHUNK_SIZE: usize = 1000;

/// An unsaved counseling result row, as produced by import tooling.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub year: i32,
    pub round: i32,
    pub counseling_type: CounselingType,
    pub exam: Exam,
    pub college_id: i64,
    pub institute: String,
    pub academic_program_name: String,
    pub quota: String,
    pub seat_type: String,
    pub gender: String,
    pub open_rank: Option<i64>,
    pub close_rank: Option<i64>,
    pub marks: Option<i64>,
}

impl NewResult {
    fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.year,
            self.round,
            self.counseling_type.as_str(),
            self.exam.as_str(),
            self.college_id,
            self.academic_program_name,
            self.quota,
            self.seat_type,
            self.gender
        )
    }
}

fn row_to_result(row: &Row) -> rusqlite::Result<CounselingResult> {
    Ok(CounselingResult {
        id: row.get("id")?,
        year: row.get("year")?,
        round: row.get("round")?,
        counseling_type: CounselingType::from_str(&row.get::<_, String>("counseling_type")?)
            .unwrap_or(CounselingType::Jossa),
        exam: Exam::from_str(&row.get::<_, String>("exam")?).unwrap_or(Exam::Mains),
        college_id: row.get("college_id")?,
        institute: row.get("institute")?,
        academic_program_name: row.get("academic_program_name")?,
        quota: row.get("quota")?,
        seat_type: row.get("seat_type")?,
        gender: row.get("gender")?,
        open_rank: row.get("open_rank")?,
        close_rank: row.get("close_rank")?,
        marks: row.get("marks")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

/// SQLite-backed counseling result repository.
#[derive(Clone)]
pub struct ResultRepository {
    db_path: PathBuf,
}

impl ResultRepository {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Fetch all rows for one (exam, type, year, round) tuple.
    ///
    /// This is the hot path the result cache sits in front of.
    pub fn get_round(
        &self,
        exam: Exam,
        counseling_type: CounselingType,
        year: i32,
        round: i32,
    ) -> Result<Vec<CounselingResult>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT * FROM counseling_results \
             WHERE exam = ?1 AND counseling_type = ?2 AND year = ?3 AND round = ?4 \
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(
                params![exam.as_str(), counseling_type.as_str(), year, round],
                row_to_result,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fetch all rows for one college in one (type, year, round) tuple.
    ///
    /// Cutoff views on a college page query across exams, so there is no
    /// exam filter here.
    pub fn get_for_college(
        &self,
        college_id: i64,
        counseling_type: CounselingType,
        year: i32,
        round: i32,
    ) -> Result<Vec<CounselingResult>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT * FROM counseling_results \
             WHERE college_id = ?1 AND counseling_type = ?2 AND year = ?3 AND round = ?4 \
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(
                params![college_id, counseling_type.as_str(), year, round],
                row_to_result,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Bulk-insert rows, skipping duplicates within the batch.
    ///
    /// Duplicate suppression is best-effort: rows whose identity tuple
    /// repeats inside the batch are dropped, nothing guards against rows
    /// already present from an earlier import (use `delete_batch` for
    /// re-imports). Returns (inserted, skipped).
    pub fn bulk_insert(&self, rows: &[NewResult]) -> Result<(usize, usize)> {
        let mut conn = connect(&self.db_path)?;
        let now = Utc::now().to_rfc3339();

        let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
        let mut inserted = 0usize;
        let mut skipped = 0usize;

        for chunk in rows.chunks(IMPORT_CHUNK_SIZE) {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO counseling_results \
                     (year, round, counseling_type, exam, college_id, institute, \
                      academic_program_name, quota, seat_type, gender, \
                      open_rank, close_rank, marks, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
                )?;
                for row in chunk {
                    if !seen.insert(row.identity_key()) {
                        skipped += 1;
                        continue;
                    }
                    stmt.execute(params![
                        row.year,
                        row.round,
                        row.counseling_type.as_str(),
                        row.exam.as_str(),
                        row.college_id,
                        row.institute,
                        row.academic_program_name,
                        row.quota,
                        row.seat_type,
                        row.gender,
                        row.open_rank,
                        row.close_rank,
                        row.marks,
                        now,
                    ])?;
                    inserted += 1;
                }
            }
            tx.commit()?;
        }

        debug!(inserted, skipped, "bulk insert finished");
        Ok((inserted, skipped))
    }

    /// Delete every row for one (exam, type, year) batch.
    ///
    /// Re-imports are delete-then-reinsert; callers must also invalidate
    /// the corresponding cache keys.
    pub fn delete_batch(
        &self,
        exam: Exam,
        counseling_type: CounselingType,
        year: i32,
    ) -> Result<usize> {
        let conn = connect(&self.db_path)?;
        let deleted = conn.execute(
            "DELETE FROM counseling_results \
             WHERE exam = ?1 AND counseling_type = ?2 AND year = ?3",
            params![exam.as_str(), counseling_type.as_str(), year],
        )?;
        Ok(deleted)
    }

    /// Count all result rows.
    pub fn count(&self) -> Result<u64> {
        let conn = connect(&self.db_path)?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM counseling_results", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollegeType;
    use crate::repository::{init_schema, CollegeRepository};
    use tempfile::tempdir;

    fn test_row(college_id: i64, seat_type: &str, close_rank: i64) -> NewResult {
        NewResult {
            year: 2024,
            round: 1,
            counseling_type: CounselingType::Jossa,
            exam: Exam::Advanced,
            college_id,
            institute: "IIT Bombay".to_string(),
            academic_program_name: "Computer Science".to_string(),
            quota: "AI".to_string(),
            seat_type: seat_type.to_string(),
            gender: "Gender-Neutral".to_string(),
            open_rank: Some(1),
            close_rank: Some(close_rank),
            marks: None,
        }
    }

    fn setup() -> (ResultRepository, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        init_schema(&db_path).unwrap();
        let college = CollegeRepository::new(&db_path)
            .upsert_by_name("IIT Bombay", CollegeType::Iit)
            .unwrap();
        (ResultRepository::new(&db_path), college.id, dir)
    }

    #[test]
    fn test_bulk_insert_skips_in_batch_duplicates() {
        let (repo, college_id, _dir) = setup();
        let rows = vec![
            test_row(college_id, "OPEN", 100),
            test_row(college_id, "OPEN", 100),
            test_row(college_id, "SC", 50),
        ];
        let (inserted, skipped) = repo.bulk_insert(&rows).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(skipped, 1);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_get_round_filters_all_fields() {
        let (repo, college_id, _dir) = setup();
        let mut other_year = test_row(college_id, "OPEN", 200);
        other_year.year = 2023;
        repo.bulk_insert(&[test_row(college_id, "OPEN", 100), other_year])
            .unwrap();

        let rows = repo
            .get_round(Exam::Advanced, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close_rank, Some(100));

        let rows = repo
            .get_round(Exam::Mains, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_delete_batch_is_scoped() {
        let (repo, college_id, _dir) = setup();
        let mut other_year = test_row(college_id, "OPEN", 200);
        other_year.year = 2023;
        repo.bulk_insert(&[test_row(college_id, "OPEN", 100), other_year])
            .unwrap();

        let deleted = repo
            .delete_batch(Exam::Advanced, CounselingType::Jossa, 2024)
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_for_college_ignores_exam() {
        let (repo, college_id, _dir) = setup();
        let mut mains = test_row(college_id, "OPEN", 300);
        mains.exam = Exam::Mains;
        repo.bulk_insert(&[test_row(college_id, "OPEN", 100), mains])
            .unwrap();

        let rows = repo
            .get_for_college(college_id, CounselingType::Jossa, 2024, 1)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
