//! Bulk import of scraped counseling result rows.
//!
//! Input is a JSON array of raw scraped rows. Institutes are resolved to
//! colleges by name, creating unmoderated stubs for unseen names; rows
//! whose institute name is blank are dropped. Inserts run in fixed-size
//! chunks with in-batch duplicate suppression, and affected cache keys
//! are deleted afterwards so replaced rounds cannot be served stale.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use crate::cache::ResultCache;
use crate::config::Settings;
use crate::models::{CollegeType, CounselingType, Exam};
use crate::repository::{CollegeRepository, NewResult, ResultRepository};

/// One scraped row as it appears in the input file.
#[derive(Debug, Deserialize)]
struct RawRow {
    institute: String,
    academic_program_name: String,
    quota: String,
    seat_type: String,
    gender: String,
    round: i32,
    open_rank: Option<i64>,
    close_rank: Option<i64>,
    marks: Option<i64>,
}

/// College category implied by a counseling type, for created stubs.
fn college_type_for(counseling_type: CounselingType) -> CollegeType {
    match counseling_type {
        CounselingType::Jossa => CollegeType::Iit,
        CounselingType::Csab | CounselingType::Wbjee => CollegeType::Gfti,
        CounselingType::Bitsat => CollegeType::Bits,
        CounselingType::NeetPg => CollegeType::NeetPg,
        CounselingType::Jac => CollegeType::Jac,
    }
}

pub fn cmd_import(
    settings: &Settings,
    file: &Path,
    exam: &str,
    counseling_type: &str,
    year: i32,
    replace: bool,
) -> anyhow::Result<()> {
    let exam = Exam::from_str(exam)
        .ok_or_else(|| anyhow::anyhow!("unknown exam: {}", exam))?;
    let counseling_type = CounselingType::from_str(counseling_type)
        .ok_or_else(|| anyhow::anyhow!("unknown counseling type: {}", counseling_type))?;

    settings.ensure_dirs()?;
    let db_path = settings.db_path();
    crate::repository::init_schema(&db_path)?;
    let colleges = CollegeRepository::new(&db_path);
    let results = ResultRepository::new(&db_path);

    let raw = fs::read_to_string(file)?;
    let rows: Vec<RawRow> = serde_json::from_str(&raw)?;
    println!(
        "{} Read {} rows from {}",
        style("→").cyan(),
        rows.len(),
        file.display()
    );

    if replace {
        let deleted = results.delete_batch(exam, counseling_type, year)?;
        println!(
            "{} Deleted {} existing rows for {}/{}/{}",
            style("→").cyan(),
            deleted,
            exam.as_str(),
            counseling_type.as_str(),
            year
        );
    }

    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Resolve institute names once; repeated names are the common case.
    let mut college_ids: HashMap<String, i64> = HashMap::new();
    let stub_type = college_type_for(counseling_type);
    let mut new_rows = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        progress.inc(1);
        if row.institute.trim().is_empty() {
            dropped += 1;
            continue;
        }
        let college_id = match college_ids.get(&row.institute) {
            Some(id) => *id,
            None => {
                let college = colleges.upsert_by_name(&row.institute, stub_type)?;
                college_ids.insert(row.institute.clone(), college.id);
                college.id
            }
        };
        new_rows.push(NewResult {
            year,
            round: row.round,
            counseling_type,
            exam,
            college_id,
            institute: row.institute,
            academic_program_name: row.academic_program_name,
            quota: row.quota,
            seat_type: row.seat_type,
            gender: row.gender,
            open_rank: row.open_rank,
            close_rank: row.close_rank,
            marks: row.marks,
        });
    }
    progress.finish_and_clear();

    let (inserted, skipped) = results.bulk_insert(&new_rows)?;

    let cache = ResultCache::new(&settings.cache_dir(), !settings.production);
    let invalidated = cache.invalidate_batch(exam, counseling_type, year)?;
    for key in &invalidated {
        println!("{} Invalidated cache key {}", style("→").cyan(), key);
    }

    println!(
        "{} Imported {} rows ({} duplicate, {} without institute), {} colleges known",
        style("✓").green(),
        inserted,
        skipped,
        dropped,
        college_ids.len()
    );
    Ok(())
}
