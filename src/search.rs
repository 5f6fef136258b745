// Keyword search over the built-in content index

use std::collections::BTreeMap;

use crate::catalog::{AUTOCOMPLETE_TERMS, SEARCH_CONTENT};
use crate::models::search::{SearchItem, SearchResult};
use crate::utils::dedup_preserving_order;

const TITLE_WEIGHT: f64 = 10.0;
const SUMMARY_WEIGHT: f64 = 5.0;
const CONTENT_WEIGHT: f64 = 3.0;
const TAG_WEIGHT: f64 = 3.0;

/// Characters of context kept on each side of a content match
const SNIPPET_CONTEXT: usize = 20;

const MAX_SUGGESTIONS: usize = 5;
const MAX_AUTOCOMPLETE: usize = 10;

/// Score every indexed item against `query` and return matches, best first
pub fn search_content(
    query: &str,
    content_type: Option<&str>,
    category: Option<&str>,
) -> Vec<SearchResult> {
    search_items(SEARCH_CONTENT, query, content_type, category)
}

pub fn search_items(
    items: &[SearchItem],
    query: &str,
    content_type: Option<&str>,
    category: Option<&str>,
) -> Vec<SearchResult> {
    let query = query.to_lowercase();
    let mut results = Vec::new();

    for item in items {
        if content_type.is_some_and(|t| item.content_type != t) {
            continue;
        }
        if category.is_some_and(|c| !item.categories.contains(&c)) {
            continue;
        }

        let mut score = 0.0;
        let mut highlights = Vec::new();

        if item.title.to_lowercase().contains(&query) {
            score += TITLE_WEIGHT;
            highlights.push(item.title.to_string());
        }

        if item.summary.to_lowercase().contains(&query) {
            score += SUMMARY_WEIGHT;
            highlights.push(item.summary.to_string());
        }

        if let Some(snippet) = content_snippet(item.content, &query) {
            score += CONTENT_WEIGHT;
            highlights.push(snippet);
        }

        for tag in item.tags {
            if tag.to_lowercase().contains(&query) {
                score += TAG_WEIGHT;
                highlights.push(format!("Tag: {}", tag));
            }
        }

        if score > 0.0 {
            results.push(SearchResult {
                id: item.id.to_string(),
                title: item.title.to_string(),
                summary: item.summary.to_string(),
                content_type: item.content_type.to_string(),
                url: item.url.to_string(),
                relevance_score: score,
                highlights,
            });
        }
    }

    // Stable sort keeps index order among equal scores
    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results
}

/// `...context...` around the first match of an already-lowercased query
fn content_snippet(content: &str, query_lower: &str) -> Option<String> {
    let content_lower = content.to_lowercase();
    let byte_idx = content_lower.find(query_lower)?;

    let match_start = content_lower[..byte_idx].chars().count();
    let query_len = query_lower.chars().count();
    let chars: Vec<char> = content.chars().collect();

    let start = match_start.saturating_sub(SNIPPET_CONTEXT).min(chars.len());
    let end = (match_start + query_len + SNIPPET_CONTEXT).min(chars.len());
    let excerpt: String = chars[start..end.max(start)].iter().collect();

    Some(format!("...{}...", excerpt))
}

/// Related queries for the topic of `query`, followed by general ones
pub fn suggested_queries(query: &str) -> Vec<String> {
    let mut suggestions: Vec<&str> = Vec::new();

    if query.contains("فشار خون") {
        suggestions.extend(["کاهش فشار خون", "داروهای فشار خون", "رژیم غذایی فشار خون"]);
    } else if query.contains("سرطان") {
        suggestions.extend(["غربالگری سرطان", "پیشگیری از سرطان", "علائم هشدار سرطان"]);
    } else if query.contains("قلب") {
        suggestions.extend(["سلامت قلب", "بیماری های قلبی", "ورزش برای قلب"]);
    }

    suggestions.extend(["پیشگیری", "سبک زندگی سالم", "تغذیه سالم"]);

    let mut unique = dedup_preserving_order(suggestions.into_iter().map(String::from).collect());
    unique.truncate(MAX_SUGGESTIONS);
    unique
}

/// Number of results per category; every indexed category is present
pub fn count_results_by_category(results: &[SearchResult]) -> BTreeMap<String, usize> {
    count_in(SEARCH_CONTENT, results)
}

fn count_in(items: &[SearchItem], results: &[SearchResult]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = items
        .iter()
        .flat_map(|item| item.categories.iter())
        .map(|c| (c.to_string(), 0))
        .collect();

    for result in results {
        if let Some(item) = items.iter().find(|item| item.id == result.id) {
            for category in item.categories {
                if let Some(count) = counts.get_mut(*category) {
                    *count += 1;
                }
            }
        }
    }

    counts
}

/// Known terms starting with `prefix`, shortest first
pub fn autocomplete(prefix: &str) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let mut matches: Vec<&str> = AUTOCOMPLETE_TERMS
        .iter()
        .copied()
        .filter(|term| term.to_lowercase().starts_with(&prefix))
        .collect();

    matches.sort_by_key(|term| term.chars().count());
    matches
        .into_iter()
        .take(MAX_AUTOCOMPLETE)
        .map(String::from)
        .collect()
}
