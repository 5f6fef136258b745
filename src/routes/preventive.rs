// Preventive health content: articles, resources, categories and tips

use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::AppState;
use crate::catalog;
use crate::error::{ApiError, Result};
use crate::models::content::{
    Article, ArticleQuery, Category, CategoryQuery, FeaturedQuery, PreventiveResource,
    ResourceQuery, TipQuery,
};
use crate::utils::{check_range, non_empty};

const MAX_PAGE_LIMIT: usize = 50;
const MAX_FEATURED_LIMIT: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles_handler))
        .route("/articles/:article_id", get(get_article_handler))
        .route("/featured-articles", get(featured_articles_handler))
        .route("/resources", get(list_resources_handler))
        .route("/resources/:resource_id", get(get_resource_handler))
        .route("/categories", get(list_categories_handler))
        .route("/categories/:category_id", get(get_category_handler))
        .route(
            "/categories/:category_id/subcategories",
            get(subcategories_handler),
        )
        .route("/health-topics", get(health_topics_handler))
        .route("/health-calendar", get(health_calendar_handler))
        .route("/preventive-tips", get(preventive_tips_handler))
}

async fn list_articles_handler(Query(query): Query<ArticleQuery>) -> Result<Json<Vec<Article>>> {
    check_range("limit", query.limit, 1, MAX_PAGE_LIMIT)?;
    Ok(Json(catalog::list_articles(
        non_empty(&query.category),
        non_empty(&query.tag),
        query.limit,
        query.offset,
    )))
}

async fn get_article_handler(Path(article_id): Path<String>) -> Result<Json<Article>> {
    catalog::find_article(&article_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Article with ID {} not found", article_id)))
}

async fn featured_articles_handler(
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<Vec<Article>>> {
    check_range("limit", query.limit, 1, MAX_FEATURED_LIMIT)?;
    Ok(Json(catalog::featured_articles(query.limit)))
}

async fn list_resources_handler(
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<PreventiveResource>>> {
    check_range("limit", query.limit, 1, MAX_PAGE_LIMIT)?;
    Ok(Json(catalog::list_resources(
        non_empty(&query.category),
        non_empty(&query.resource_type),
        query.limit,
        query.offset,
    )))
}

async fn get_resource_handler(Path(resource_id): Path<String>) -> Result<Json<PreventiveResource>> {
    catalog::find_resource(&resource_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Resource with ID {} not found", resource_id)))
}

async fn list_categories_handler(Query(query): Query<CategoryQuery>) -> Json<Vec<Category>> {
    Json(catalog::list_categories(non_empty(&query.parent_id)))
}

async fn get_category_handler(Path(category_id): Path<String>) -> Result<Json<Category>> {
    catalog::find_category(&category_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Category with ID {} not found", category_id)))
}

async fn subcategories_handler(Path(category_id): Path<String>) -> Json<Vec<Category>> {
    Json(catalog::subcategories(&category_id))
}

async fn health_topics_handler() -> Json<Value> {
    Json(json!({ "topics": *catalog::HEALTH_TOPICS }))
}

/// Recommended screenings by age and gender
async fn health_calendar_handler() -> Json<Value> {
    Json(json!({ "screenings": *catalog::SCREENINGS }))
}

async fn preventive_tips_handler(Query(query): Query<TipQuery>) -> Json<Value> {
    Json(json!({ "tips": catalog::tips(non_empty(&query.category)) }))
}
