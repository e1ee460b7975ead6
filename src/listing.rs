//! Listing pipeline: filter, sort, and paginate fetched result rows.
//!
//! Every results table (JoSAA, CSAB, BITSAT, NEET-PG, per-college
//! cutoffs) runs the same chain over rows already fetched for one
//! required-filter combination. The pipeline is a pure function of its
//! inputs and is recomputed on every filter, sort, or page change.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{CounselingResult, SortField};

/// Sort direction for an active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Optional per-field constraints, AND-combined.
///
/// Text fields are case-insensitive substring matches, except
/// `seat_type`, which is driven by a closed dropdown and therefore an
/// exact match. The two thresholds are one-sided and intentionally
/// inverted: a larger close rank and a smaller marks score both mean
/// "easier to get into".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilters {
    pub institute: Option<String>,
    pub academic_program_name: Option<String>,
    pub quota: Option<String>,
    pub seat_type: Option<String>,
    pub gender: Option<String>,
    /// Keep rows with `close_rank >= min_close_rank`.
    pub min_close_rank: Option<i64>,
    /// Keep rows with `marks <= max_marks`.
    pub max_marks: Option<i64>,
}

impl ListingFilters {
    fn is_empty_field(value: &Option<String>) -> bool {
        value.as_deref().map(str::is_empty).unwrap_or(true)
    }

    /// Whether a row satisfies every active constraint.
    pub fn matches(&self, row: &CounselingResult) -> bool {
        fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref() {
                None | Some("") => true,
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
            }
        }

        if !contains_ci(&row.institute, &self.institute) {
            return false;
        }
        if !contains_ci(&row.academic_program_name, &self.academic_program_name) {
            return false;
        }
        if !contains_ci(&row.quota, &self.quota) {
            return false;
        }
        if !contains_ci(&row.gender, &self.gender) {
            return false;
        }
        if !Self::is_empty_field(&self.seat_type)
            && row.seat_type.as_str() != self.seat_type.as_deref().unwrap_or("")
        {
            return false;
        }
        if let Some(min) = self.min_close_rank {
            match row.close_rank {
                Some(rank) if rank >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.max_marks {
            match row.marks {
                Some(marks) if marks <= max => {}
                _ => return false,
            }
        }
        true
    }
}

/// One listing request: filters plus at most one sort key and a page.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub filters: ListingFilters,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
    /// 1-indexed.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Distinct values present in the unfiltered input, for filter dropdowns.
///
/// Computed from the unfiltered rows so narrowing one filter never
/// shrinks the option lists of the others. First-seen order, deduped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableValues {
    pub institutes: Vec<String>,
    pub academic_program_names: Vec<String>,
    pub quotas: Vec<String>,
    pub seat_types: Vec<String>,
    pub genders: Vec<String>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ListingOutput {
    pub rows: Vec<CounselingResult>,
    /// Always at least 1, even for an empty filtered set.
    pub total_pages: usize,
    /// Size of the filtered set before pagination.
    pub total_rows: usize,
    pub available: AvailableValues,
}

pub const DEFAULT_PAGE_SIZE: usize = 50;

fn sort_value(row: &CounselingResult, field: SortField) -> Option<i64> {
    match field {
        SortField::OpenRank => row.open_rank,
        SortField::CloseRank => row.close_rank,
        SortField::Marks => row.marks,
    }
}

fn dedup_first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Run the pipeline over fetched rows.
///
/// Pages beyond `total_pages` yield an empty row slice rather than
/// clamping to the last page.
pub fn apply(rows: &[CounselingResult], query: &ListingQuery) -> ListingOutput {
    let available = AvailableValues {
        institutes: dedup_first_seen(rows.iter().map(|r| r.institute.as_str())),
        academic_program_names: dedup_first_seen(
            rows.iter().map(|r| r.academic_program_name.as_str()),
        ),
        quotas: dedup_first_seen(rows.iter().map(|r| r.quota.as_str())),
        seat_types: dedup_first_seen(rows.iter().map(|r| r.seat_type.as_str())),
        genders: dedup_first_seen(rows.iter().map(|r| r.gender.as_str())),
    };

    let mut filtered: Vec<CounselingResult> = rows
        .iter()
        .filter(|row| query.filters.matches(row))
        .cloned()
        .collect();

    if let Some(field) = query.sort {
        let direction = query.direction.unwrap_or(SortDirection::Ascending);
        // Missing values sort last regardless of direction.
        filtered.sort_by(|a, b| {
            match (sort_value(a, field), sort_value(b, field)) {
                (Some(x), Some(y)) => match direction {
                    SortDirection::Ascending => x.cmp(&y),
                    SortDirection::Descending => y.cmp(&x),
                },
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total_rows = filtered.len();
    let total_pages = total_rows.div_ceil(page_size).max(1);

    let start = (page - 1).saturating_mul(page_size);
    let rows = if start >= filtered.len() {
        Vec::new()
    } else {
        filtered[start..(start + page_size).min(filtered.len())].to_vec()
    };

    ListingOutput {
        rows,
        total_pages,
        total_rows,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CounselingType, Exam};
    use chrono::Utc;

    fn row(
        institute: &str,
        program: &str,
        seat_type: &str,
        close_rank: Option<i64>,
        marks: Option<i64>,
    ) -> CounselingResult {
        let now = Utc::now();
        CounselingResult {
            id: 0,
            year: 2024,
            round: 1,
            counseling_type: CounselingType::Jossa,
            exam: Exam::Advanced,
            college_id: 1,
            institute: institute.to_string(),
            academic_program_name: program.to_string(),
            quota: "AI".to_string(),
            seat_type: seat_type.to_string(),
            gender: "Gender-Neutral".to_string(),
            open_rank: close_rank.map(|r| r / 2),
            close_rank,
            marks,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_substring_filter_case_insensitive() {
        let rows = vec![
            row("IIT Bombay", "Computer Science", "OPEN", Some(100), None),
            row("IIT Delhi", "Electrical", "OPEN", Some(200), None),
        ];
        let query = ListingQuery {
            filters: ListingFilters {
                institute: Some("bombay".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = apply(&rows, &query);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].institute, "IIT Bombay");
    }

    #[test]
    fn test_seat_type_exact_match() {
        let rows = vec![
            row("IIT Bombay", "CS", "OPEN", Some(100), None),
            row("IIT Bombay", "CS", "OPEN (PwD)", Some(5), None),
        ];
        let query = ListingQuery {
            filters: ListingFilters {
                seat_type: Some("OPEN".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = apply(&rows, &query);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].seat_type, "OPEN");
    }

    #[test]
    fn test_rank_threshold_keeps_easier_seats() {
        // close_rank 100 >= 60 passes, 50 >= 60 fails.
        let rows = vec![
            row("A", "CS", "OPEN", Some(100), None),
            row("B", "CS", "SC", Some(50), None),
        ];
        let query = ListingQuery {
            filters: ListingFilters {
                min_close_rank: Some(60),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = apply(&rows, &query);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].close_rank, Some(100));
    }

    #[test]
    fn test_marks_threshold_inverted() {
        let rows = vec![
            row("A", "CS", "OPEN", None, Some(350)),
            row("B", "CS", "OPEN", None, Some(250)),
        ];
        let query = ListingQuery {
            filters: ListingFilters {
                max_marks: Some(300),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = apply(&rows, &query);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].marks, Some(250));
    }

    #[test]
    fn test_filters_and_combined_soundness() {
        let rows = vec![
            row("IIT Bombay", "Computer Science", "OPEN", Some(100), None),
            row("IIT Bombay", "Mechanical", "OPEN", Some(900), None),
            row("IIT Delhi", "Computer Science", "OPEN", Some(120), None),
        ];
        let filters = ListingFilters {
            institute: Some("Bombay".to_string()),
            academic_program_name: Some("computer".to_string()),
            ..Default::default()
        };
        let query = ListingQuery {
            filters: filters.clone(),
            ..Default::default()
        };
        let out = apply(&rows, &query);
        // Soundness: every output row satisfies every active predicate.
        assert!(out.rows.iter().all(|r| filters.matches(r)));
        // Completeness: every input row satisfying the predicates is present.
        let expected = rows.iter().filter(|r| filters.matches(r)).count();
        assert_eq!(out.total_rows, expected);
        assert_eq!(out.total_rows, 1);
    }

    #[test]
    fn test_sort_missing_values_last() {
        let rows = vec![
            row("A", "CS", "OPEN", Some(300), None),
            row("B", "CS", "OPEN", None, None),
            row("C", "CS", "OPEN", Some(100), None),
        ];
        let query = ListingQuery {
            sort: Some(SortField::CloseRank),
            direction: Some(SortDirection::Ascending),
            ..Default::default()
        };
        let out = apply(&rows, &query);
        let order: Vec<_> = out.rows.iter().map(|r| r.institute.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);

        let query = ListingQuery {
            sort: Some(SortField::CloseRank),
            direction: Some(SortDirection::Descending),
            ..Default::default()
        };
        let out = apply(&rows, &query);
        let order: Vec<_> = out.rows.iter().map(|r| r.institute.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_sort_idempotent() {
        let rows = vec![
            row("A", "CS", "OPEN", Some(300), None),
            row("C", "CS", "OPEN", Some(100), None),
        ];
        let query = ListingQuery {
            sort: Some(SortField::CloseRank),
            direction: Some(SortDirection::Ascending),
            page_size: Some(100),
            ..Default::default()
        };
        let once = apply(&rows, &query);
        let twice = apply(&once.rows, &query);
        let a: Vec<_> = once.rows.iter().map(|r| r.close_rank).collect();
        let b: Vec<_> = twice.rows.iter().map(|r| r.close_rank).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_sort_preserves_input_order() {
        let rows = vec![
            row("B", "CS", "OPEN", Some(300), None),
            row("A", "CS", "OPEN", Some(100), None),
        ];
        let out = apply(&rows, &ListingQuery::default());
        let order: Vec<_> = out.rows.iter().map(|r| r.institute.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_pages_partition_filtered_set() {
        let rows: Vec<_> = (0..25)
            .map(|i| row(&format!("College {}", i), "CS", "OPEN", Some(i), None))
            .collect();
        let mut collected = Vec::new();
        let base = ListingQuery {
            page_size: Some(10),
            ..Default::default()
        };
        let first = apply(&rows, &base);
        assert_eq!(first.total_pages, 3);
        for page in 1..=first.total_pages {
            let query = ListingQuery {
                page: Some(page),
                page_size: Some(10),
                ..Default::default()
            };
            collected.extend(apply(&rows, &query).rows);
        }
        assert_eq!(collected.len(), rows.len());
        let ids: HashSet<_> = collected.iter().map(|r| r.institute.clone()).collect();
        assert_eq!(ids.len(), rows.len());
    }

    #[test]
    fn test_empty_set_has_one_page() {
        let out = apply(&[], &ListingQuery::default());
        assert_eq!(out.total_pages, 1);
        assert!(out.rows.is_empty());
        assert_eq!(out.total_rows, 0);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let rows = vec![row("A", "CS", "OPEN", Some(1), None)];
        let query = ListingQuery {
            page: Some(5),
            page_size: Some(10),
            ..Default::default()
        };
        let out = apply(&rows, &query);
        assert!(out.rows.is_empty());
        assert_eq!(out.total_pages, 1);
    }

    #[test]
    fn test_available_values_from_unfiltered_input() {
        let rows = vec![
            row("IIT Bombay", "CS", "OPEN", Some(100), None),
            row("IIT Delhi", "EE", "SC", Some(200), None),
            row("IIT Bombay", "CS", "OPEN", Some(300), None),
        ];
        let query = ListingQuery {
            filters: ListingFilters {
                institute: Some("Delhi".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = apply(&rows, &query);
        // Filtering on institute must not shrink the other option lists.
        assert_eq!(out.available.institutes, vec!["IIT Bombay", "IIT Delhi"]);
        assert_eq!(out.available.seat_types, vec!["OPEN", "SC"]);
        assert_eq!(out.rows.len(), 1);
    }
}
