//! Per-counseling-type profiles.
//!
//! Each counseling type carries its own valid-years table, rounds per
//! year, latest published round, and sort-field set (rank pair vs marks).
//! A profile is selected once per listing view; the result cache consults
//! its round marker to refuse queries for rounds that have not been
//! published yet.

use serde::{Deserialize, Serialize};

use super::{CounselingType, Exam};

/// The most recent published round for a counseling type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMarker {
    pub year: i32,
    pub round: i32,
}

impl RoundMarker {
    /// Whether a requested (year, round) lies chronologically beyond
    /// this marker, i.e. asks for data that does not exist yet.
    pub fn is_beyond(&self, year: i32, round: i32) -> bool {
        year > self.year || (year == self.year && round > self.round)
    }
}

/// Numeric fields a listing view may sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    OpenRank,
    CloseRank,
    Marks,
}

/// Static lookup tables for one counseling type.
#[derive(Debug, Clone, Serialize)]
pub struct CounselingProfile {
    pub counseling_type: CounselingType,
    /// Exams whose rows appear under this counseling type.
    pub exams: Vec<Exam>,
    /// Years with published data, newest first.
    pub years: Vec<i32>,
    /// Number of rounds held per year.
    pub rounds: Vec<(i32, i32)>,
    pub latest: RoundMarker,
    pub sort_fields: Vec<SortField>,
}

impl CounselingProfile {
    /// Look up the profile for a counseling type.
    pub fn for_type(counseling_type: CounselingType) -> Self {
        match counseling_type {
            CounselingType::Jossa => Self {
                counseling_type,
                exams: vec![Exam::Advanced, Exam::Mains],
                years: vec![2025, 2024, 2023, 2022, 2021, 2020],
                rounds: vec![
                    (2025, 5),
                    (2024, 5),
                    (2023, 6),
                    (2022, 6),
                    (2021, 6),
                    (2020, 6),
                ],
                latest: RoundMarker {
                    year: 2025,
                    round: 5,
                },
                sort_fields: vec![SortField::OpenRank, SortField::CloseRank],
            },
            CounselingType::Csab => Self {
                counseling_type,
                exams: vec![Exam::Mains],
                years: vec![2025, 2024, 2023, 2022],
                rounds: vec![(2025, 2), (2024, 2), (2023, 2), (2022, 2)],
                latest: RoundMarker {
                    year: 2025,
                    round: 2,
                },
                sort_fields: vec![SortField::OpenRank, SortField::CloseRank],
            },
            CounselingType::Bitsat => Self {
                counseling_type,
                exams: vec![Exam::Bitsat],
                years: vec![2025, 2024, 2023],
                rounds: vec![(2025, 1), (2024, 1), (2023, 1)],
                latest: RoundMarker {
                    year: 2025,
                    round: 1,
                },
                sort_fields: vec![SortField::Marks],
            },
            CounselingType::Wbjee => Self {
                counseling_type,
                exams: vec![Exam::Wbjee],
                years: vec![2024, 2023],
                rounds: vec![(2024, 1), (2023, 1)],
                latest: RoundMarker {
                    year: 2024,
                    round: 1,
                },
                sort_fields: vec![SortField::OpenRank, SortField::CloseRank],
            },
            CounselingType::NeetPg => Self {
                counseling_type,
                exams: vec![Exam::NeetPg],
                years: vec![2024, 2023],
                rounds: vec![(2024, 3), (2023, 3)],
                latest: RoundMarker {
                    year: 2024,
                    round: 3,
                },
                sort_fields: vec![SortField::OpenRank, SortField::CloseRank],
            },
            CounselingType::Jac => Self {
                counseling_type,
                exams: vec![Exam::Mains],
                years: vec![2025, 2024, 2023],
                rounds: vec![(2025, 5), (2024, 5), (2023, 5)],
                latest: RoundMarker {
                    year: 2025,
                    round: 5,
                },
                sort_fields: vec![SortField::OpenRank, SortField::CloseRank],
            },
        }
    }

    /// Rounds held in a given year, or 0 for years with no data.
    pub fn rounds_in(&self, year: i32) -> i32 {
        self.rounds
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, r)| *r)
            .unwrap_or(0)
    }
}
