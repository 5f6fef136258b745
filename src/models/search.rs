use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An indexed piece of site content
#[derive(Debug, Clone)]
pub struct SearchItem {
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub content: &'static str,
    pub content_type: &'static str,
    pub url: &'static str,
    pub categories: &'static [&'static str],
    pub tags: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// article, resource, topic, ...
    pub content_type: String,
    pub url: String,
    pub relevance_score: f64,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    pub categories: BTreeMap<String, usize>,
    pub suggested_queries: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub content_type: Option<String>,
    pub category: Option<String>,
    #[serde(default = "super::content::default_page_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
}
