//! College directory endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::error::{join_err, ApiError};
use super::super::AppState;
use crate::models::{College, CollegeImage, CounselingProfile, CounselingType, Review};

/// Directory search parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// List colleges, optionally filtered by a name substring.
pub async fn list_colleges(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let colleges = state.colleges.clone();
    let found = tokio::task::spawn_blocking(move || colleges.search(params.q.as_deref()))
        .await
        .map_err(join_err)??;
    Ok(Json(found))
}

/// College detail: the row plus its reviews and gallery images.
#[derive(Debug, Serialize)]
pub struct CollegeDetail {
    #[serde(flatten)]
    pub college: College,
    pub reviews: Vec<Review>,
    pub images: Vec<CollegeImage>,
}

pub async fn college_detail(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let colleges = state.colleges.clone();
    let reviews = state.reviews.clone();
    let detail = tokio::task::spawn_blocking(move || -> Result<Option<CollegeDetail>, ApiError> {
        let college = match colleges.get(college_id)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let review_rows = reviews.reviews_for(college_id)?;
        let images = reviews.images_for(college_id)?;
        Ok(Some(CollegeDetail {
            college,
            reviews: review_rows,
            images,
        }))
    })
    .await
    .map_err(join_err)??
    .ok_or(ApiError::NotFound("college"))?;

    Ok(Json(detail))
}

/// Direction of a popularity adjustment.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonkDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct BonkBody {
    pub direction: BonkDirection,
}

#[derive(Debug, Serialize)]
pub struct BonkResponse {
    pub college_id: i64,
    pub bongs: i64,
}

/// Adjust the popularity counter by one in either direction.
///
/// The adjustment is a single atomic UPDATE at the store, so concurrent
/// bonks cannot lose updates.
pub async fn bonk_college(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
    Json(body): Json<BonkBody>,
) -> Result<impl IntoResponse, ApiError> {
    let delta = match body.direction {
        BonkDirection::Up => 1,
        BonkDirection::Down => -1,
    };

    let colleges = state.colleges.clone();
    let bongs = tokio::task::spawn_blocking(move || colleges.adjust_bongs(college_id, delta))
        .await
        .map_err(join_err)??
        .ok_or(ApiError::NotFound("college"))?;

    Ok(Json(BonkResponse { college_id, bongs }))
}

/// Static lookup tables for one counseling type.
pub async fn counseling_profile(
    Path(type_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let counseling_type = CounselingType::from_str(&type_name)
        .ok_or_else(|| ApiError::Validation(format!("unknown counseling type: {}", type_name)))?;
    Ok(Json(CounselingProfile::for_type(counseling_type)))
}
