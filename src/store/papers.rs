// Research paper library with view and download counters

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::RwLock;

use crate::error::ApiError;
use crate::models::papers::{DownloadReceipt, Paper, PaperCategory, PaperListResponse};

const DOWNLOAD_NOTE: &str = "In a real implementation, this would return a file download.";

pub struct PaperStore {
    categories: Vec<PaperCategory>,
    papers: RwLock<Vec<Paper>>,
}

impl Default for PaperStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperStore {
    /// Store seeded with the sample library
    pub fn new() -> Self {
        Self::with_papers(seed_categories(), seed_papers())
    }

    pub fn with_papers(categories: Vec<PaperCategory>, papers: Vec<Paper>) -> Self {
        Self {
            categories,
            papers: RwLock::new(papers),
        }
    }

    pub fn categories(&self) -> Vec<PaperCategory> {
        self.categories.clone()
    }

    /// Filter and paginate the library
    ///
    /// `page` is clamped into `1..=total_pages`; `per_page` must be non-zero.
    pub fn list(
        &self,
        page: i64,
        per_page: usize,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<PaperListResponse, ApiError> {
        if per_page == 0 {
            return Err(ApiError::Validation(
                "per_page must be greater than or equal to 1".to_string(),
            ));
        }

        let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let papers = self.read()?;
        let filtered: Vec<&Paper> = papers
            .iter()
            .filter(|p| match category.filter(|c| !c.is_empty()) {
                Some(c) => p.categories.iter().any(|id| id == c),
                None => true,
            })
            .filter(|p| match &needle {
                Some(n) => matches_search(p, n),
                None => true,
            })
            .collect();

        let total = filtered.len();
        let total_pages = total.div_ceil(per_page);

        let mut page = page.max(1) as usize;
        if total_pages > 0 && page > total_pages {
            page = total_pages;
        }

        let start = (page - 1).saturating_mul(per_page).min(total);
        let end = start.saturating_add(per_page).min(total);

        Ok(PaperListResponse {
            papers: filtered[start..end].iter().map(|p| (*p).clone()).collect(),
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Fetch a paper and count the view
    pub fn view(&self, paper_id: &str) -> Result<Paper, ApiError> {
        let mut papers = self.write()?;
        let paper = papers
            .iter_mut()
            .find(|p| p.id == paper_id)
            .ok_or_else(|| paper_not_found(paper_id))?;
        paper.views += 1;
        Ok(paper.clone())
    }

    /// Count a download and describe it
    pub fn download(&self, paper_id: &str) -> Result<DownloadReceipt, ApiError> {
        let mut papers = self.write()?;
        let paper = papers
            .iter_mut()
            .find(|p| p.id == paper_id)
            .ok_or_else(|| paper_not_found(paper_id))?;
        paper.downloads += 1;

        Ok(DownloadReceipt {
            message: format!("Download initiated for paper: {}", paper.title),
            paper_id: paper.id.clone(),
            downloads: paper.downloads,
            note: DOWNLOAD_NOTE.to_string(),
        })
    }

    pub fn featured(&self, limit: usize) -> Result<Vec<Paper>, ApiError> {
        Ok(self
            .read()?
            .iter()
            .filter(|p| p.is_featured)
            .take(limit)
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Paper>>, ApiError> {
        self.papers
            .read()
            .map_err(|_| ApiError::Internal(anyhow!("paper store lock poisoned")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Paper>>, ApiError> {
        self.papers
            .write()
            .map_err(|_| ApiError::Internal(anyhow!("paper store lock poisoned")))
    }
}

fn matches_search(paper: &Paper, needle: &str) -> bool {
    paper.title.to_lowercase().contains(needle)
        || paper.abstract_text.to_lowercase().contains(needle)
        || paper.keywords.iter().any(|k| k.to_lowercase().contains(needle))
}

fn paper_not_found(paper_id: &str) -> ApiError {
    ApiError::NotFound(format!("Paper with ID {} not found", paper_id))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn category(id: &str, name: &str, description: &str, count: u32) -> PaperCategory {
    PaperCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        count,
    }
}

fn seed_categories() -> Vec<PaperCategory> {
    vec![
        category("1", "Cardiology", "Studies related to heart and cardiovascular systems", 5),
        category("2", "Neurology", "Studies related to the nervous system", 3),
        category("3", "Oncology", "Studies related to cancer research", 7),
        category("4", "Infectious Diseases", "Studies related to infectious diseases", 4),
        category("5", "Public Health", "Studies related to public health initiatives", 2),
    ]
}

struct Seed {
    id: &'static str,
    title: &'static str,
    authors: [&'static str; 2],
    published: (i32, u32, u32),
    journal: &'static str,
    abstract_text: &'static str,
    categories: &'static [&'static str],
    keywords: [&'static str; 4],
    is_featured: bool,
    views: u64,
    downloads: u64,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "1",
        title: "Advances in Cardiovascular Disease Prevention",
        authors: ["John Doe", "Jane Smith"],
        published: (2023, 5, 15),
        journal: "Journal of Cardiology",
        abstract_text: "This paper explores the latest advances in preventing cardiovascular diseases through lifestyle modifications and pharmacological interventions.",
        categories: &["1"],
        keywords: ["cardiovascular", "prevention", "lifestyle", "pharmacology"],
        is_featured: true,
        views: 250,
        downloads: 120,
    },
    Seed {
        id: "2",
        title: "Understanding Alzheimer's Disease Progression",
        authors: ["Emily Johnson", "Michael Brown"],
        published: (2023, 6, 22),
        journal: "Neurology Today",
        abstract_text: "A comprehensive review of the latest research on Alzheimer's disease progression and potential treatment approaches.",
        categories: &["2"],
        keywords: ["alzheimer's", "neurodegeneration", "cognitive decline", "treatment"],
        is_featured: true,
        views: 180,
        downloads: 95,
    },
    Seed {
        id: "3",
        title: "Impact of COVID-19 on Mental Health",
        authors: ["Sarah Wilson", "Robert Davis"],
        published: (2023, 3, 10),
        journal: "Journal of Public Health",
        abstract_text: "This study examines the psychological impact of the COVID-19 pandemic on different population groups.",
        categories: &["4", "5"],
        keywords: ["COVID-19", "mental health", "pandemic", "psychological impact"],
        is_featured: true,
        views: 320,
        downloads: 210,
    },
    Seed {
        id: "4",
        title: "Novel Approaches to Cancer Immunotherapy",
        authors: ["David Lee", "Susan Miller"],
        published: (2023, 7, 5),
        journal: "Cancer Research",
        abstract_text: "This paper discusses innovative approaches to cancer immunotherapy that have shown promising results in clinical trials.",
        categories: &["3"],
        keywords: ["cancer", "immunotherapy", "clinical trials", "oncology"],
        is_featured: false,
        views: 150,
        downloads: 80,
    },
    Seed {
        id: "5",
        title: "Genetic Factors in Heart Disease",
        authors: ["Linda Wilson", "Thomas Clark"],
        published: (2023, 4, 18),
        journal: "Genetics in Medicine",
        abstract_text: "An analysis of genetic factors that contribute to the development and progression of heart disease.",
        categories: &["1"],
        keywords: ["genetics", "heart disease", "risk factors", "genomics"],
        is_featured: false,
        views: 130,
        downloads: 65,
    },
];

fn seed_papers() -> Vec<Paper> {
    SEEDS
        .iter()
        .map(|s| {
            let (year, month, day) = s.published;
            Paper {
                id: s.id.to_string(),
                title: s.title.to_string(),
                authors: s.authors.iter().map(|a| a.to_string()).collect(),
                publication_date: date(year, month, day),
                journal: s.journal.to_string(),
                abstract_text: s.abstract_text.to_string(),
                categories: s.categories.iter().map(|c| c.to_string()).collect(),
                keywords: s.keywords.iter().map(|k| k.to_string()).collect(),
                is_featured: s.is_featured,
                download_url: format!("/api/health-exploration/papers/{}/download", s.id),
                views: s.views,
                downloads: s.downloads,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults() {
        let store = PaperStore::new();
        let page = store.list(1, 10, None, None).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.papers.len(), 5);
    }

    #[test]
    fn test_category_and_search_filters() {
        let store = PaperStore::new();

        let cardiology = store.list(1, 10, Some("1"), None).unwrap();
        let ids: Vec<_> = cardiology.papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);

        // Keyword match is case-insensitive
        let covid = store.list(1, 10, None, Some("covid")).unwrap();
        assert_eq!(covid.total, 1);
        assert_eq!(covid.papers[0].id, "3");

        let none = store.list(1, 10, Some("2"), Some("cancer")).unwrap();
        assert_eq!(none.total, 0);
        assert_eq!(none.total_pages, 0);
        assert_eq!(none.page, 1);
        assert!(none.papers.is_empty());
    }

    #[test]
    fn test_huge_page_on_empty_result() {
        let store = PaperStore::new();

        let empty = store.list(i64::MAX, 10, None, Some("zzz")).unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.papers.is_empty());

        let wide = store.list(3, usize::MAX, None, Some("zzz")).unwrap();
        assert!(wide.papers.is_empty());

        let all = store.list(1, usize::MAX, None, None).unwrap();
        assert_eq!(all.papers.len(), 5);
        assert_eq!(all.total_pages, 1);
    }

    #[test]
    fn test_page_is_clamped() {
        let store = PaperStore::new();

        let last = store.list(99, 2, None, None).unwrap();
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.papers.len(), 1);

        let first = store.list(-4, 2, None, None).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.papers.len(), 2);

        assert!(matches!(
            store.list(1, 0, None, None),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_view_and_download_counters() {
        let store = PaperStore::new();
        assert_eq!(store.view("1").unwrap().views, 251);
        assert_eq!(store.view("1").unwrap().views, 252);

        let receipt = store.download("2").unwrap();
        assert_eq!(receipt.downloads, 96);
        assert_eq!(
            receipt.message,
            "Download initiated for paper: Understanding Alzheimer's Disease Progression"
        );

        let err = store.view("42").unwrap_err();
        assert_eq!(err.to_string(), "Paper with ID 42 not found");
        assert!(store.download("42").is_err());
    }

    #[test]
    fn test_featured_and_categories() {
        let store = PaperStore::new();
        let featured: Vec<_> = store
            .featured(2)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(featured, vec!["1", "2"]);
        assert_eq!(store.featured(10).unwrap().len(), 3);
        assert_eq!(store.categories().len(), 5);
    }

    #[test]
    fn test_publication_date_serializes_as_iso() {
        let store = PaperStore::new();
        let paper = store.view("1").unwrap();
        let value = serde_json::to_value(&paper).unwrap();
        assert_eq!(value["publication_date"], "2023-05-15T00:00:00");
        assert!(value["abstract"].is_string());
    }
}
