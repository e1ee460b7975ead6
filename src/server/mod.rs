//! Web server for browsing counseling results and the college directory.
//!
//! Exposes a JSON API over the repositories plus the disk-backed result
//! cache for the hot round-lookup path. Stateless between requests; every
//! handler runs independently against the shared store.

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cache::ResultCache;
use crate::config::Settings;
use crate::repository::{CollegeRepository, ResultRepository, ReviewRepository};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub colleges: Arc<CollegeRepository>,
    pub results: Arc<ResultRepository>,
    pub reviews: Arc<ReviewRepository>,
    pub result_cache: Arc<ResultCache>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let db_path = settings.db_path();
        Self {
            colleges: Arc::new(CollegeRepository::new(&db_path)),
            results: Arc::new(ResultRepository::new(&db_path)),
            reviews: Arc::new(ReviewRepository::new(&db_path)),
            // Production nodes never persist cache files locally.
            result_cache: Arc::new(ResultCache::new(
                &settings.cache_dir(),
                !settings.production,
            )),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
