use std::collections::HashSet;

use crate::models::job::JobPosting;

pub const NO_JOB_MESSAGE: &str = "No matching job found.";

/// First posting whose title contains `query`, ignoring case. The query is a
/// literal substring, not a pattern. Postings without a title never match.
pub fn find_first_by_title<'a>(postings: &'a [JobPosting], query: &str) -> Option<&'a JobPosting> {
    let needle = query.to_lowercase();
    postings.iter().find(|posting| title_contains(posting, &needle))
}

/// Every posting whose title contains `query`, ignoring case.
pub fn filter_by_title<'a>(postings: &'a [JobPosting], query: &str) -> Vec<&'a JobPosting> {
    let needle = query.to_lowercase();
    postings
        .iter()
        .filter(|posting| title_contains(posting, &needle))
        .collect()
}

fn title_contains(posting: &JobPosting, lowered_needle: &str) -> bool {
    posting
        .title
        .as_deref()
        .map(|title| title.to_lowercase().contains(lowered_needle))
        .unwrap_or(false)
}

/// Titles in first-seen order, deduplicated case-insensitively. Display only;
/// the corpus itself keeps every duplicate.
pub fn distinct_titles(postings: &[JobPosting]) -> Vec<String> {
    let mut seen = HashSet::new();
    postings
        .iter()
        .filter_map(|posting| posting.title.as_deref())
        .filter(|title| seen.insert(title.to_lowercase()))
        .map(str::to_string)
        .collect()
}
