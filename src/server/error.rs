//! API error taxonomy.
//!
//! Validation problems surface as client errors, unknown college IDs as
//! not-found, and everything coming out of the store or cache as a
//! generic server error. There is no retry policy anywhere; this is a
//! low-stakes read-mostly browsing tool.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::cache::CacheError;
use crate::repository::RepositoryError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store error: {0}")]
    Upstream(#[from] RepositoryError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(e) => {
                error!("Upstream store error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Cache(e) => {
                error!("Cache error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Flatten a `spawn_blocking` join error into an upstream error.
///
/// Repository calls run on the blocking pool; a panicked task is
/// indistinguishable from a failed store to the client.
pub fn join_err(e: tokio::task::JoinError) -> ApiError {
    error!("Blocking task failed: {}", e);
    ApiError::Internal
}
