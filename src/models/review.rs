//! Community-contributed content: reviews and gallery images.
//!
//! Both are append-only from the application's perspective and carry no
//! author identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An anonymous free-text review of a college.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Database row ID.
    pub id: i64,
    pub college_id: i64,
    pub comment: String,
    /// 1-5; validated as an integer only.
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

/// A community-contributed gallery image for a college.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeImage {
    /// Database row ID.
    pub id: i64,
    pub college_id: i64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
