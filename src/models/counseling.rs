//! Counseling result models.
//!
//! A counseling result is one opening/closing-rank row for a specific
//! (institute, program, quota, seat type, gender) combination in one
//! counseling round. Rows are bulk-imported from scraped allotment data
//! and never modified afterwards except by a full re-import of their
//! (exam, type, year) batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counseling process that produced a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounselingType {
    Jossa,
    Csab,
    Bitsat,
    Wbjee,
    NeetPg,
    Jac,
}

impl CounselingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jossa => "JOSSA",
            Self::Csab => "CSAB",
            Self::Bitsat => "BITSAT",
            Self::Wbjee => "WBJEE",
            Self::NeetPg => "NEET_PG",
            Self::Jac => "JAC",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "JOSSA" => Some(Self::Jossa),
            "CSAB" => Some(Self::Csab),
            "BITSAT" => Some(Self::Bitsat),
            "WBJEE" => Some(Self::Wbjee),
            "NEET_PG" => Some(Self::NeetPg),
            "JAC" => Some(Self::Jac),
            _ => None,
        }
    }
}

/// Entrance exam whose rank (or score) a result row is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exam {
    Advanced,
    Mains,
    Wbjee,
    NeetPg,
    Bitsat,
}

impl Exam {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advanced => "ADVANCED",
            Self::Mains => "MAINS",
            Self::Wbjee => "WBJEE",
            Self::NeetPg => "NEET_PG",
            Self::Bitsat => "BITSAT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ADVANCED" => Some(Self::Advanced),
            "MAINS" => Some(Self::Mains),
            "WBJEE" => Some(Self::Wbjee),
            "NEET_PG" => Some(Self::NeetPg),
            "BITSAT" => Some(Self::Bitsat),
            _ => None,
        }
    }

    /// Whether this exam is scored by marks instead of ranks.
    ///
    /// Marks-scored exams leave `open_rank`/`close_rank` empty and
    /// populate `marks`; threshold filtering inverts direction for them.
    pub fn is_marks_based(&self) -> bool {
        matches!(self, Self::Bitsat)
    }
}

/// One opening/closing-rank row ("ORCR") for a counseling round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounselingResult {
    /// Database row ID.
    pub id: i64,
    pub year: i32,
    pub round: i32,
    pub counseling_type: CounselingType,
    pub exam: Exam,
    /// Owning college. Rows whose institute cannot be resolved to a
    /// college are dropped at import time.
    pub college_id: i64,
    /// Denormalized institute display name; may differ from the
    /// college's canonical name.
    pub institute: String,
    pub academic_program_name: String,
    pub quota: String,
    pub seat_type: String,
    pub gender: String,
    /// Empty for marks-scored exams.
    pub open_rank: Option<i64>,
    pub close_rank: Option<i64>,
    /// Only populated for marks-scored exams (BITSAT).
    pub marks: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counseling_type_round_trip() {
        for t in [
            CounselingType::Jossa,
            CounselingType::Csab,
            CounselingType::Bitsat,
            CounselingType::Wbjee,
            CounselingType::NeetPg,
            CounselingType::Jac,
        ] {
            assert_eq!(CounselingType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(CounselingType::from_str("JOSAA"), None);
    }

    #[test]
    fn test_exam_marks_based() {
        assert!(Exam::Bitsat.is_marks_based());
        assert!(!Exam::Advanced.is_marks_based());
        assert!(!Exam::NeetPg.is_marks_based());
    }
}
