//! Counseling result endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::super::error::{join_err, ApiError};
use super::super::AppState;
use crate::cache::CacheStatus;
use crate::listing::{self, ListingFilters, ListingQuery, SortDirection};
use crate::models::{CounselingType, Exam, SortField};

/// Response marker header distinguishing hit, miss, and too-early.
pub(crate) const CACHE_STATUS_HEADER: &str = "x-orcr-cache";

/// Cache lifetime for hits: historical rounds never change.
const CACHE_CONTROL_HIT: &str = "public, max-age=31536000, immutable";
/// Misses may not have been persisted; keep downstream caching short.
const CACHE_CONTROL_MISS: &str = "public, max-age=300";

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Required filters for the cached round lookup.
#[derive(Debug, Deserialize)]
pub struct RoundParams {
    pub exam: Option<String>,
    #[serde(rename = "type")]
    pub counseling_type: Option<String>,
    pub year: Option<i32>,
    pub round: Option<i32>,
}

pub(crate) fn parse_round_params(
    params: &RoundParams,
) -> Result<(Exam, CounselingType, i32, i32), ApiError> {
    let exam = params
        .exam
        .as_deref()
        .ok_or_else(|| ApiError::Validation("missing required field: exam".to_string()))
        .and_then(|s| {
            Exam::from_str(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown exam: {}", s)))
        })?;
    let counseling_type = params
        .counseling_type
        .as_deref()
        .ok_or_else(|| ApiError::Validation("missing required field: type".to_string()))
        .and_then(|s| {
            CounselingType::from_str(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown counseling type: {}", s)))
        })?;
    let year = params
        .year
        .ok_or_else(|| ApiError::Validation("missing required field: year".to_string()))?;
    let round = params
        .round
        .ok_or_else(|| ApiError::Validation("missing required field: round".to_string()))?;
    Ok((exam, counseling_type, year, round))
}

/// Cached lookup of all rows for one (exam, type, year, round) tuple.
///
/// The body is a gzip-compressed JSON array regardless of how the lookup
/// was satisfied; cache headers differ between hits and misses.
pub async fn round_results(
    State(state): State<AppState>,
    Query(params): Query<RoundParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (exam, counseling_type, year, round) = parse_round_params(&params)?;

    let cache = state.result_cache.clone();
    let store = state.results.clone();
    let answer = tokio::task::spawn_blocking(move || {
        cache.lookup(&store, exam, counseling_type, year, round)
    })
    .await
    .map_err(join_err)??;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    let cache_control = match answer.status {
        CacheStatus::Hit => CACHE_CONTROL_HIT,
        CacheStatus::Miss | CacheStatus::TooEarly => CACHE_CONTROL_MISS,
    };
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    headers.insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(answer.status.as_str()),
    );

    Ok((headers, answer.body))
}

/// Query params for the server-side listing view.
#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub exam: Option<String>,
    #[serde(rename = "type")]
    pub counseling_type: Option<String>,
    pub year: Option<i32>,
    pub round: Option<i32>,
    pub institute: Option<String>,
    pub program: Option<String>,
    pub quota: Option<String>,
    pub seat_type: Option<String>,
    pub gender: Option<String>,
    pub min_close_rank: Option<i64>,
    pub max_marks: Option<i64>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Fetch one round and run the listing pipeline over it server-side.
pub async fn round_listing(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, ApiError> {
    let round_params = RoundParams {
        exam: params.exam.clone(),
        counseling_type: params.counseling_type.clone(),
        year: params.year,
        round: params.round,
    };
    let (exam, counseling_type, year, round) = parse_round_params(&round_params)?;

    let store = state.results.clone();
    let rows = tokio::task::spawn_blocking(move || {
        store.get_round(exam, counseling_type, year, round)
    })
    .await
    .map_err(join_err)??;

    let query = ListingQuery {
        filters: ListingFilters {
            institute: params.institute,
            academic_program_name: params.program,
            quota: params.quota,
            seat_type: params.seat_type,
            gender: params.gender,
            min_close_rank: params.min_close_rank,
            max_marks: params.max_marks,
        },
        sort: params.sort,
        direction: params.direction,
        page: params.page,
        page_size: params.page_size,
    };

    Ok(Json(listing::apply(&rows, &query)))
}

/// Required filters for the per-college cutoff view. No exam filter.
#[derive(Debug, Deserialize)]
pub struct CollegeResultParams {
    #[serde(rename = "type")]
    pub counseling_type: Option<String>,
    pub year: Option<i32>,
    pub round: Option<i32>,
}

/// All rows for one college in one (type, year, round) tuple.
pub async fn college_results(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
    Query(params): Query<CollegeResultParams>,
) -> Result<impl IntoResponse, ApiError> {
    let counseling_type = params
        .counseling_type
        .as_deref()
        .ok_or_else(|| ApiError::Validation("missing required field: type".to_string()))
        .and_then(|s| {
            CounselingType::from_str(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown counseling type: {}", s)))
        })?;
    let year = params
        .year
        .ok_or_else(|| ApiError::Validation("missing required field: year".to_string()))?;
    let round = params
        .round
        .ok_or_else(|| ApiError::Validation("missing required field: round".to_string()))?;

    let colleges = state.colleges.clone();
    let store = state.results.clone();
    let rows = tokio::task::spawn_blocking(move || {
        if colleges.get(college_id)?.is_none() {
            return Ok(None);
        }
        store
            .get_for_college(college_id, counseling_type, year, round)
            .map(Some)
    })
    .await
    .map_err(join_err)??
    .ok_or(ApiError::NotFound("college"))?;

    Ok(Json(rows))
}
