use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::catalog::POPULAR_SEARCHES;
use crate::error::{ApiError, Result};
use crate::models::search::{AutocompleteQuery, SearchQuery, SearchResponse};
use crate::search;
use crate::utils::{check_range, non_empty};

const MAX_RESULTS: usize = 50;

/// Search routes rooted at `base`, reachable with and without a trailing slash
pub fn router(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(search_handler))
        .route(&format!("{}/", base), get(search_handler))
        .route(&format!("{}/popular", base), get(popular_handler))
        .route(&format!("{}/autocomplete", base), get(autocomplete_handler))
}

/// GET /?q=...&content_type=...&category=...&limit=10
async fn search_handler(Query(query): Query<SearchQuery>) -> Result<Json<SearchResponse>> {
    if query.q.is_empty() {
        return Err(ApiError::Validation("Search query cannot be empty".to_string()));
    }
    check_range("limit", query.limit, 1, MAX_RESULTS)?;

    let content_type = non_empty(&query.content_type);
    let category = non_empty(&query.category);
    tracing::info!(
        "Search query: {}, filters: type={:?}, category={:?}",
        query.q,
        content_type,
        category
    );

    let results = search::search_content(&query.q, content_type, category);
    let categories = search::count_results_by_category(&results);
    let total_results = results.len();

    Ok(Json(SearchResponse {
        suggested_queries: search::suggested_queries(&query.q),
        query: query.q,
        results: results.into_iter().take(query.limit).collect(),
        total_results,
        categories,
    }))
}

/// GET /popular
async fn popular_handler() -> Json<Value> {
    Json(json!({ "popular_searches": POPULAR_SEARCHES }))
}

/// GET /autocomplete?q=...
async fn autocomplete_handler(Query(query): Query<AutocompleteQuery>) -> Result<Json<Value>> {
    if query.q.is_empty() {
        return Err(ApiError::Validation("q must not be empty".to_string()));
    }
    Ok(Json(json!({ "suggestions": search::autocomplete(&query.q) })))
}
