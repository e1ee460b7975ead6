//! Database schema initialization.

use std::path::Path;

use tracing::info;

use super::{connect, Result};

/// Initialize the database schema. Idempotent.
pub fn init_schema(db_path: &Path) -> Result<()> {
    let conn = connect(db_path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS colleges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            location TEXT,
            college_type TEXT NOT NULL,
            official_website TEXT,
            cover_image TEXT,
            nirf INTEGER,
            total_students INTEGER,
            male_students INTEGER,
            female_students INTEGER,
            bongs INTEGER NOT NULL DEFAULT 0,
            moderated INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counseling_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year INTEGER NOT NULL,
            round INTEGER NOT NULL,
            counseling_type TEXT NOT NULL,
            exam TEXT NOT NULL,
            college_id INTEGER NOT NULL REFERENCES colleges(id),
            institute TEXT NOT NULL,
            academic_program_name TEXT NOT NULL,
            quota TEXT NOT NULL,
            seat_type TEXT NOT NULL,
            gender TEXT NOT NULL,
            open_rank INTEGER,
            close_rank INTEGER,
            marks INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_results_round
            ON counseling_results(exam, counseling_type, year, round);
        CREATE INDEX IF NOT EXISTS idx_results_college
            ON counseling_results(college_id, year, round);

        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            college_id INTEGER NOT NULL REFERENCES colleges(id),
            comment TEXT NOT NULL,
            rating INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS college_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            college_id INTEGER NOT NULL REFERENCES colleges(id),
            url TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    info!("Database schema initialized at {}", db_path.display());
    Ok(())
}
