//! Repository layer for SQLite persistence.
//!
//! Repositories hold a database path and open a connection per call,
//! keeping them cheap to clone into the web server's shared state.
//! Blocking calls from async handlers go through `spawn_blocking`.

mod college;
mod result;
mod review;
mod schema;

pub use college::CollegeRepository;
pub use result::{NewResult, ResultRepository};
pub use review::ReviewRepository;
pub use schema::init_schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Errors from the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open a connection with foreign keys enforced.
pub(crate) fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
