//! College repository for SQLite persistence.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{connect, parse_datetime, Result};
use crate::models::{College, CollegeType};

/// SQLite-backed college repository.
#[derive(Clone)]
pub struct CollegeRepository {
    db_path: PathBuf,
}

fn row_to_college(row: &Row) -> rusqlite::Result<College> {
    Ok(College {
        id: row.get("id")?,
        name: row.get("name")?,
        location: row.get("location")?,
        college_type: CollegeType::from_str(&row.get::<_, String>("college_type")?)
            .unwrap_or(CollegeType::Other),
        official_website: row.get("official_website")?,
        cover_image: row.get("cover_image")?,
        nirf: row.get("nirf")?,
        total_students: row.get("total_students")?,
        male_students: row.get("male_students")?,
        female_students: row.get("female_students")?,
        bongs: row.get("bongs")?,
        moderated: row.get::<_, i64>("moderated")? != 0,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

impl CollegeRepository {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Get a college by ID.
    pub fn get(&self, id: i64) -> Result<Option<College>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT * FROM colleges WHERE id = ?")?;
        let college = stmt.query_row(params![id], row_to_college).optional()?;
        Ok(college)
    }

    /// Get a college by its canonical name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<College>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT * FROM colleges WHERE name = ?")?;
        let college = stmt.query_row(params![name], row_to_college).optional()?;
        Ok(college)
    }

    /// List colleges, optionally filtered by a name substring.
    ///
    /// An empty or missing query returns the whole directory. Matching is
    /// delegated to SQLite's LIKE operator.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<College>> {
        let conn = connect(&self.db_path)?;
        match query.filter(|q| !q.is_empty()) {
            Some(q) => {
                let pattern = format!("%{}%", q.replace('%', "\\%").replace('_', "\\_"));
                let mut stmt = conn.prepare(
                    "SELECT * FROM colleges WHERE name LIKE ? ESCAPE '\\' ORDER BY name",
                )?;
                let colleges = stmt
                    .query_map(params![pattern], row_to_college)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(colleges)
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM colleges ORDER BY name")?;
                let colleges = stmt
                    .query_map([], row_to_college)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(colleges)
            }
        }
    }

    /// Insert a college, returning it with its assigned ID.
    pub fn create(&self, college: &College) -> Result<College> {
        let conn = connect(&self.db_path)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO colleges (name, location, college_type, official_website, cover_image, \
             nirf, total_students, male_students, female_students, bongs, moderated, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                college.name,
                college.location,
                college.college_type.as_str(),
                college.official_website,
                college.cover_image,
                college.nirf,
                college.total_students,
                college.male_students,
                college.female_students,
                college.bongs,
                college.moderated as i64,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let mut saved = college.clone();
        saved.id = id;
        Ok(saved)
    }

    /// Get the college with the given name, creating a stub if absent.
    ///
    /// This is the import path's entry point: result rows reference
    /// institutes by display name, and unknown names become unmoderated
    /// directory entries.
    pub fn upsert_by_name(&self, name: &str, college_type: CollegeType) -> Result<College> {
        if let Some(existing) = self.get_by_name(name)? {
            return Ok(existing);
        }
        self.create(&College::stub(name.to_string(), college_type))
    }

    /// Adjust the popularity counter by a signed delta, atomically.
    ///
    /// A single UPDATE avoids the read-modify-write race two concurrent
    /// adjustments would otherwise hit. Returns the updated counter, or
    /// None when the college does not exist.
    pub fn adjust_bongs(&self, id: i64, delta: i64) -> Result<Option<i64>> {
        let conn = connect(&self.db_path)?;
        let changed = conn.execute(
            "UPDATE colleges SET bongs = bongs + ?1, updated_at = ?2 WHERE id = ?3",
            params![delta, Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let bongs =
            conn.query_row("SELECT bongs FROM colleges WHERE id = ?", params![id], |row| {
                row.get(0)
            })?;
        Ok(Some(bongs))
    }

    /// Count all colleges.
    pub fn count(&self) -> Result<u64> {
        let conn = connect(&self.db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM colleges", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::init_schema;
    use tempfile::tempdir;

    fn test_repo() -> (CollegeRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        init_schema(&db_path).unwrap();
        (CollegeRepository::new(&db_path), dir)
    }

    #[test]
    fn test_upsert_by_name_creates_once() {
        let (repo, _dir) = test_repo();
        let a = repo
            .upsert_by_name("IIT Bombay", CollegeType::Iit)
            .unwrap();
        let b = repo
            .upsert_by_name("IIT Bombay", CollegeType::Iit)
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_search_substring() {
        let (repo, _dir) = test_repo();
        repo.upsert_by_name("IIT Bombay", CollegeType::Iit).unwrap();
        repo.upsert_by_name("IIT Delhi", CollegeType::Iit).unwrap();
        repo.upsert_by_name("NIT Trichy", CollegeType::Gfti).unwrap();

        let hits = repo.search(Some("IIT")).unwrap();
        assert_eq!(hits.len(), 2);

        let hits = repo.search(Some("Bombay")).unwrap();
        assert_eq!(hits.len(), 1);

        let all = repo.search(None).unwrap();
        assert_eq!(all.len(), 3);
        let all_empty_q = repo.search(Some("")).unwrap();
        assert_eq!(all_empty_q.len(), 3);
    }

    #[test]
    fn test_adjust_bongs_sequential() {
        let (repo, _dir) = test_repo();
        let mut college = College::stub("BITS Pilani".to_string(), CollegeType::Bits);
        college.bongs = 5;
        let saved = repo.create(&college).unwrap();

        assert_eq!(repo.adjust_bongs(saved.id, 1).unwrap(), Some(6));
        assert_eq!(repo.adjust_bongs(saved.id, 1).unwrap(), Some(7));
        assert_eq!(repo.adjust_bongs(saved.id, -1).unwrap(), Some(6));
        assert_eq!(repo.adjust_bongs(9999, 1).unwrap(), None);
    }
}
