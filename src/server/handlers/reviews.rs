//! Review and gallery image endpoints. Append-only, no auth.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::super::error::{join_err, ApiError};
use super::super::AppState;

#[derive(Debug, Deserialize)]
pub struct NewReviewBody {
    pub comment: Option<String>,
    pub rating: Option<i32>,
}

/// Create an anonymous review for a college.
pub async fn add_review(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
    Json(body): Json<NewReviewBody>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = body
        .comment
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: comment".to_string()))?;
    let rating = body
        .rating
        .ok_or_else(|| ApiError::Validation("missing required field: rating".to_string()))?;

    let colleges = state.colleges.clone();
    let reviews = state.reviews.clone();
    let created = tokio::task::spawn_blocking(move || {
        if colleges.get(college_id)?.is_none() {
            return Ok(None);
        }
        reviews.add_review(college_id, &comment, rating).map(Some)
    })
    .await
    .map_err(join_err)??
    .ok_or(ApiError::NotFound("college"))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct NewImageBody {
    pub url: Option<String>,
}

/// Add a community-contributed gallery image for a college.
pub async fn add_image(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
    Json(body): Json<NewImageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let url = body
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: url".to_string()))?;

    let colleges = state.colleges.clone();
    let reviews = state.reviews.clone();
    let created = tokio::task::spawn_blocking(move || {
        if colleges.get(college_id)?.is_none() {
            return Ok(None);
        }
        reviews.add_image(college_id, &url).map(Some)
    })
    .await
    .map_err(join_err)??
    .ok_or(ApiError::NotFound("college"))?;

    Ok((StatusCode::CREATED, Json(created)))
}
