//! Review and gallery image repository for SQLite persistence.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Row};

use super::{connect, parse_datetime, Result};
use crate::models::{CollegeImage, Review};

fn row_to_review(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get("id")?,
        college_id: row.get("college_id")?,
        comment: row.get("comment")?,
        rating: row.get("rating")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn row_to_image(row: &Row) -> rusqlite::Result<CollegeImage> {
    Ok(CollegeImage {
        id: row.get("id")?,
        college_id: row.get("college_id")?,
        url: row.get("url")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

/// SQLite-backed repository for append-only community content.
#[derive(Clone)]
pub struct ReviewRepository {
    db_path: PathBuf,
}

impl ReviewRepository {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Append a review, returning it with its assigned ID.
    pub fn add_review(&self, college_id: i64, comment: &str, rating: i32) -> Result<Review> {
        let conn = connect(&self.db_path)?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO reviews (college_id, comment, rating, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![college_id, comment, rating, now.to_rfc3339()],
        )?;
        Ok(Review {
            id: conn.last_insert_rowid(),
            college_id,
            comment: comment.to_string(),
            rating,
            created_at: now,
        })
    }

    /// List reviews for a college, newest first.
    pub fn reviews_for(&self, college_id: i64) -> Result<Vec<Review>> {
        let conn = connect(&self.db_path)?;
        let mut stmt = conn
            .prepare("SELECT * FROM reviews WHERE college_id = ? ORDER BY created_at DESC, id DESC")?;
        let reviews = stmt
            .query_map(params![college_id], row_to_review)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    /// Append a gallery image, returning it with its assigned ID.
    pub fn add_image(&self, college_id: i64, url: &str) -> Result<CollegeImage> {
        let conn = connect(&self.db_path)?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO college_images (college_id, url, created_at) VALUES (?1, ?2, ?3)",
            params![college_id, url, now.to_rfc3339()],
        )?;
        Ok(CollegeImage {
            id: conn.last_insert_rowid(),
            college_id,
            url: url.to_string(),
            created_at: now,
        })
    }

    /// List gallery images for a college, oldest first.
    pub fn images_for(&self, college_id: i64) -> Result<Vec<CollegeImage>> {
        let conn = connect(&self.db_path)?;
        let mut stmt =
            conn.prepare("SELECT * FROM college_images WHERE college_id = ? ORDER BY id")?;
        let images = stmt
            .query_map(params![college_id], row_to_image)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollegeType;
    use crate::repository::{init_schema, CollegeRepository};
    use tempfile::tempdir;

    fn setup() -> (ReviewRepository, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        init_schema(&db_path).unwrap();
        let college = CollegeRepository::new(&db_path)
            .upsert_by_name("IIT Madras", CollegeType::Iit)
            .unwrap();
        (ReviewRepository::new(&db_path), college.id, dir)
    }

    #[test]
    fn test_reviews_append_only() {
        let (repo, college_id, _dir) = setup();
        repo.add_review(college_id, "Great campus", 5).unwrap();
        repo.add_review(college_id, "Food is average", 3).unwrap();

        let reviews = repo.reviews_for(college_id).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].comment, "Food is average");
    }

    #[test]
    fn test_images_for_unknown_college_is_empty() {
        let (repo, college_id, _dir) = setup();
        repo.add_image(college_id, "https://example.com/a.jpg")
            .unwrap();
        assert!(repo.images_for(college_id + 1).unwrap().is_empty());
        assert_eq!(repo.images_for(college_id).unwrap().len(), 1);
    }
}
