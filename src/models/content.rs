use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: String,
    pub published_date: String,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Estimated reading time in minutes
    pub read_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreventiveResource {
    pub id: String,
    pub title: String,
    pub description: String,
    /// video, infographic, ...
    pub resource_type: String,
    pub url: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthTopic {
    pub id: String,
    pub name: String,
    pub description: String,
    pub related_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub name: String,
    pub frequency: String,
    pub recommended_ages: String,
    pub gender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreventiveTip {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceQuery {
    pub category: Option<String>,
    pub resource_type: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedQuery {
    #[serde(default = "default_featured_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryQuery {
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TipQuery {
    pub category: Option<String>,
}

pub(crate) fn default_page_limit() -> usize {
    10
}

pub(crate) fn default_featured_limit() -> usize {
    3
}
