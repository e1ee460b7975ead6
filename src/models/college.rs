//! College directory models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag deciding which counseling processes apply to a college.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollegeType {
    Iit,
    Gfti,
    Bits,
    Jac,
    NeetPg,
    Other,
}

impl CollegeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iit => "IIT",
            Self::Gfti => "GFTI",
            Self::Bits => "BITS",
            Self::Jac => "JAC",
            Self::NeetPg => "NEET_PG",
            Self::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IIT" => Some(Self::Iit),
            "GFTI" => Some(Self::Gfti),
            "BITS" => Some(Self::Bits),
            "JAC" => Some(Self::Jac),
            "NEET_PG" => Some(Self::NeetPg),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A college known to the directory.
///
/// Colleges are created by import tooling (upsert by name) or lazily by
/// the first imported result row that references them. They are never
/// deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct College {
    /// Database row ID.
    pub id: i64,
    /// Canonical name, unique; the natural lookup key for import tooling.
    pub name: String,
    pub location: Option<String>,
    pub college_type: CollegeType,
    pub official_website: Option<String>,
    pub cover_image: Option<String>,
    /// NIRF rank, when published.
    pub nirf: Option<i32>,
    pub total_students: Option<i32>,
    pub male_students: Option<i32>,
    pub female_students: Option<i32>,
    /// Popularity counter. Never negative by convention, not enforced.
    pub bongs: i64,
    /// False means unverified/community-sourced; callers show a warning.
    pub moderated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl College {
    /// Create an unsaved college with just a name and type.
    ///
    /// This is the shape import tooling creates when a result row names
    /// an institute the directory has not seen before.
    pub fn stub(name: String, college_type: CollegeType) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by database
            name,
            location: None,
            college_type,
            official_website: None,
            cover_image: None,
            nirf: None,
            total_students: None,
            male_students: None,
            female_students: None,
            bongs: 0,
            moderated: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_college_type_round_trip() {
        for t in [
            CollegeType::Iit,
            CollegeType::Gfti,
            CollegeType::Bits,
            CollegeType::Jac,
            CollegeType::NeetPg,
            CollegeType::Other,
        ] {
            assert_eq!(CollegeType::from_str(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_stub_is_unmoderated() {
        let c = College::stub("IIT Bombay".to_string(), CollegeType::Iit);
        assert!(!c.moderated);
        assert_eq!(c.bongs, 0);
    }
}
