use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publication_date: NaiveDateTime,
    pub journal: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Category ids
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub is_featured: bool,
    pub download_url: String,
    pub views: u64,
    pub downloads: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperListResponse {
    pub papers: Vec<Paper>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaperQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "super::content::default_page_limit")]
    pub per_page: usize,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedPapersQuery {
    #[serde(default = "super::content::default_featured_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadReceipt {
    pub message: String,
    pub paper_id: String,
    pub downloads: u64,
    pub note: String,
}

fn default_page() -> i64 {
    1
}
