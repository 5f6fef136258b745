// Research paper library

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use super::AppState;
use crate::error::Result;
use crate::models::papers::{
    DownloadReceipt, FeaturedPapersQuery, Paper, PaperCategory, PaperListResponse, PaperQuery,
};
use crate::utils::non_empty;

pub fn router() -> Router<AppState> {
    // Static segments win over `:paper_id`, so categories and featured stay reachable
    Router::new()
        .route("/papers", get(list_papers_handler))
        .route("/papers/categories", get(categories_handler))
        .route("/papers/featured", get(featured_handler))
        .route("/papers/:paper_id", get(paper_details_handler))
        .route("/papers/:paper_id/download", get(download_handler))
}

/// GET /papers?page=1&per_page=10&category=...&search=...
async fn list_papers_handler(
    State(state): State<AppState>,
    Query(query): Query<PaperQuery>,
) -> Result<Json<PaperListResponse>> {
    tracing::info!(
        "Retrieving papers with page={}, per_page={}, category={:?}, search={:?}",
        query.page,
        query.per_page,
        query.category,
        query.search
    );
    Ok(Json(state.papers.list(
        query.page,
        query.per_page,
        non_empty(&query.category),
        non_empty(&query.search),
    )?))
}

async fn paper_details_handler(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<Paper>> {
    tracing::info!("Retrieving details for paper ID: {}", paper_id);
    Ok(Json(state.papers.view(&paper_id)?))
}

async fn download_handler(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<DownloadReceipt>> {
    tracing::info!("Processing download request for paper ID: {}", paper_id);
    Ok(Json(state.papers.download(&paper_id)?))
}

async fn categories_handler(State(state): State<AppState>) -> Json<Vec<PaperCategory>> {
    Json(state.papers.categories())
}

async fn featured_handler(
    State(state): State<AppState>,
    Query(query): Query<FeaturedPapersQuery>,
) -> Result<Json<Vec<Paper>>> {
    tracing::info!("Retrieving featured papers with limit={}", query.limit);
    Ok(Json(state.papers.featured(query.limit)?))
}
