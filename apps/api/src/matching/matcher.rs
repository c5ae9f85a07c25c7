//! Résumé matchers: pluggable backends that compare résumé text with the job corpus.
//!
//! Default: `TfidfMatcher` (ranked, top five by cosine similarity).
//! Alternative: `KeywordOverlapMatcher` (Boolean keyword intersection, unranked).
//!
//! `AppState` holds an `Arc<dyn ResumeMatcher>` chosen at startup via config.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::matching::tfidf::{cosine_similarity, TfidfVectorizer, VectorizeError};
use crate::matching::tokenizer::keyword_set;
use crate::models::job::JobPosting;

/// Maximum number of ranked matches returned by the TF-IDF backend.
pub const TOP_MATCHES: usize = 5;

pub const NO_MATCH_MESSAGE: &str = "No matching jobs found.";

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all matcher backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub rank: usize, // 1-based
    pub posting: JobPosting,
    /// Cosine similarity in [0, 1]. Set by ranking backends only.
    pub similarity: Option<f64>,
    /// Keywords shared between résumé and posting. Set by the keyword backend only.
    pub shared_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub backend: String, // "tfidf" | "keyword"
    pub matches: Vec<JobMatch>,
    pub message: Option<String>,
}

impl MatchReport {
    fn new(backend: MatcherBackend, matches: Vec<JobMatch>) -> Self {
        let message = matches.is_empty().then(|| NO_MATCH_MESSAGE.to_string());
        MatchReport {
            backend: backend.as_str().to_string(),
            matches,
            message,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeMatcher: Send + Sync {
    async fn match_resume(
        &self,
        resume_text: &str,
        postings: &[JobPosting],
    ) -> Result<MatchReport, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherBackend {
    #[default]
    Tfidf,
    Keyword,
}

impl MatcherBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            MatcherBackend::Tfidf => "tfidf",
            MatcherBackend::Keyword => "keyword",
        }
    }

    pub fn build(self) -> Arc<dyn ResumeMatcher> {
        match self {
            MatcherBackend::Tfidf => Arc::new(TfidfMatcher),
            MatcherBackend::Keyword => Arc::new(KeywordOverlapMatcher),
        }
    }
}

impl FromStr for MatcherBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(MatcherBackend::Tfidf),
            "keyword" => Ok(MatcherBackend::Keyword),
            other => Err(anyhow::anyhow!("unknown matcher backend '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TfidfMatcher
// ────────────────────────────────────────────────────────────────────────────

/// Ranks postings by cosine similarity between TF-IDF vectors.
///
/// Algorithm:
/// 1. corpus = [résumé, description_1, …, description_n]
/// 2. fit TF-IDF jointly over the corpus (stop words removed)
/// 3. similarity_i = cos(row_0, row_i)
/// 4. sort descending (ties: lower row first), drop zeros, keep the top five
pub struct TfidfMatcher;

#[async_trait]
impl ResumeMatcher for TfidfMatcher {
    async fn match_resume(
        &self,
        resume_text: &str,
        postings: &[JobPosting],
    ) -> Result<MatchReport, AppError> {
        Ok(rank_by_tfidf(resume_text, postings)?)
    }
}

fn rank_by_tfidf(resume_text: &str, postings: &[JobPosting]) -> Result<MatchReport, VectorizeError> {
    if postings.is_empty() {
        return Err(VectorizeError::NoDocuments);
    }

    let corpus: Vec<&str> = std::iter::once(resume_text)
        .chain(postings.iter().map(JobPosting::description_text))
        .collect();
    let matrix = TfidfVectorizer.fit_transform(&corpus)?;
    debug!(
        "Vectorized {} documents, vocabulary size {}",
        corpus.len(),
        matrix.vocabulary.len()
    );

    let resume_vec = &matrix.rows[0];
    let mut scored: Vec<(usize, f64)> = matrix.rows[1..]
        .iter()
        .enumerate()
        .map(|(idx, row)| (idx, cosine_similarity(resume_vec, row)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // Stable sort keeps row order among equal scores.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(TOP_MATCHES);

    let matches = scored
        .into_iter()
        .enumerate()
        .map(|(pos, (idx, score))| JobMatch {
            rank: pos + 1,
            posting: postings[idx].clone(),
            similarity: Some(score),
            shared_keywords: vec![],
        })
        .collect();

    Ok(MatchReport::new(MatcherBackend::Tfidf, matches))
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordOverlapMatcher
// ────────────────────────────────────────────────────────────────────────────

/// Flags every posting whose skills + education keywords intersect the résumé's
/// keywords. Corpus order, no ranking, no cut-off.
pub struct KeywordOverlapMatcher;

#[async_trait]
impl ResumeMatcher for KeywordOverlapMatcher {
    async fn match_resume(
        &self,
        resume_text: &str,
        postings: &[JobPosting],
    ) -> Result<MatchReport, AppError> {
        Ok(match_by_keywords(resume_text, postings))
    }
}

fn match_by_keywords(resume_text: &str, postings: &[JobPosting]) -> MatchReport {
    let resume_words = keyword_set(resume_text);

    let matches = postings
        .iter()
        .filter_map(|posting| {
            let requirements = format!(
                "{} {}",
                posting.skills.as_deref().unwrap_or(""),
                posting.education.as_deref().unwrap_or("")
            );
            let shared: Vec<String> = keyword_set(&requirements)
                .intersection(&resume_words)
                .cloned()
                .collect();
            (!shared.is_empty()).then(|| (posting, shared))
        })
        .enumerate()
        .map(|(pos, (posting, shared_keywords))| JobMatch {
            rank: pos + 1,
            posting: posting.clone(),
            similarity: None,
            shared_keywords,
        })
        .collect();

    MatchReport::new(MatcherBackend::Keyword, matches)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::ColumnMap;

    fn posting(id: usize, title: &str, description: &str) -> JobPosting {
        let columns = ColumnMap::from_headers(["Job Title", "Job Description"]);
        JobPosting::from_cells(id, &[title, description], &columns)
    }

    fn posting_with_skills(id: usize, skills: &str, education: &str) -> JobPosting {
        let columns = ColumnMap::from_headers(["Job Title", "skills", "Education"]);
        JobPosting::from_cells(id, &["Role", skills, education], &columns)
    }

    #[tokio::test]
    async fn test_identical_description_ranks_first_with_similarity_one() {
        let postings = vec![
            posting(0, "Chef", "prepare meals kitchen restaurant menu"),
            posting(1, "Backend Engineer", "rust tokio axum postgres services"),
            posting(2, "Designer", "figma branding typography"),
        ];
        let report = TfidfMatcher
            .match_resume("rust tokio axum postgres services", &postings)
            .await
            .unwrap();

        assert_eq!(report.matches[0].posting.id, 1);
        assert_eq!(report.matches[0].rank, 1);
        let sim = report.matches[0].similarity.unwrap();
        assert!((sim - 1.0).abs() < 1e-9, "similarity was {sim}");
        assert!(report.message.is_none());
    }

    #[tokio::test]
    async fn test_no_shared_vocabulary_reports_no_match() {
        let postings = vec![
            posting(0, "Chef", "prepare meals kitchen"),
            posting(1, "Designer", "figma typography"),
        ];
        let report = TfidfMatcher
            .match_resume("rust tokio axum", &postings)
            .await
            .unwrap();
        assert!(report.matches.is_empty());
        assert_eq!(report.message.as_deref(), Some(NO_MATCH_MESSAGE));
    }

    #[tokio::test]
    async fn test_never_more_than_five_and_never_zero_scores() {
        let mut postings: Vec<JobPosting> = (0..8)
            .map(|i| posting(i, "Engineer", &format!("rust developer level{i}")))
            .collect();
        postings.push(posting(8, "Chef", "kitchen meals"));

        let report = TfidfMatcher
            .match_resume("rust developer", &postings)
            .await
            .unwrap();
        assert_eq!(report.matches.len(), TOP_MATCHES);
        for m in &report.matches {
            assert!(m.similarity.unwrap() > 0.0);
            assert_ne!(m.posting.id, 8);
        }
    }

    #[tokio::test]
    async fn test_zero_scores_are_dropped_when_fewer_than_five_match() {
        let postings = vec![
            posting(0, "Chef", "kitchen meals"),
            posting(1, "Engineer", "rust services"),
            posting(2, "Designer", "figma"),
        ];
        let report = TfidfMatcher
            .match_resume("rust", &postings)
            .await
            .unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].posting.id, 1);
    }

    #[tokio::test]
    async fn test_results_are_sorted_descending() {
        let postings = vec![
            posting(0, "A", "rust"),
            posting(1, "B", "rust tokio axum"),
            posting(2, "C", "rust tokio"),
        ];
        let report = TfidfMatcher
            .match_resume("rust tokio axum", &postings)
            .await
            .unwrap();
        let scores: Vec<f64> = report.matches.iter().map(|m| m.similarity.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        assert_eq!(report.matches[0].posting.id, 1);
        let ranks: Vec<usize> = report.matches.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ties_keep_row_order() {
        let postings = vec![
            posting(0, "A", "rust developer"),
            posting(1, "B", "rust developer"),
        ];
        let report = TfidfMatcher
            .match_resume("rust developer", &postings)
            .await
            .unwrap();
        assert_eq!(report.matches[0].posting.id, 0);
        assert_eq!(report.matches[1].posting.id, 1);
    }

    #[tokio::test]
    async fn test_empty_corpus_is_vectorization_error() {
        let err = TfidfMatcher.match_resume("rust", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Vectorization(VectorizeError::NoDocuments)));
    }

    #[tokio::test]
    async fn test_stop_word_only_corpus_is_vectorization_error() {
        let postings = vec![posting(0, "A", "the and of")];
        let err = TfidfMatcher
            .match_resume("with the", &postings)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Vectorization(VectorizeError::EmptyVocabulary)
        ));
    }

    #[tokio::test]
    async fn test_missing_descriptions_count_as_empty() {
        let columns = ColumnMap::from_headers(["Job Title", "Job Description"]);
        let postings = vec![
            JobPosting::from_cells(0, &["No description"], &columns),
            posting(1, "Engineer", "rust"),
        ];
        let report = TfidfMatcher
            .match_resume("rust", &postings)
            .await
            .unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].posting.id, 1);
    }

    #[tokio::test]
    async fn test_keyword_backend_flags_intersections_in_corpus_order() {
        let postings = vec![
            posting_with_skills(0, "Java, Spring", "BSc Computer Science"),
            posting_with_skills(1, "Cooking", "Culinary school"),
            posting_with_skills(2, "Python; SQL", ""),
        ];
        let report = KeywordOverlapMatcher
            .match_resume("I write Python and SQL. Degree in computer science.", &postings)
            .await
            .unwrap();

        let ids: Vec<usize> = report.matches.iter().map(|m| m.posting.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(report.matches[0].shared_keywords, vec!["computer", "science"]);
        assert_eq!(report.matches[1].shared_keywords, vec!["python", "sql"]);
        assert!(report.matches.iter().all(|m| m.similarity.is_none()));
        assert_eq!(report.backend, "keyword");
    }

    #[tokio::test]
    async fn test_keyword_backend_matches_single_letter_skills() {
        let postings = vec![
            posting_with_skills(0, "C, C++", ""),
            posting_with_skills(1, "Java", ""),
        ];
        let report = KeywordOverlapMatcher
            .match_resume("C", &postings)
            .await
            .unwrap();
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].posting.id, 0);
        assert_eq!(report.matches[0].shared_keywords, vec!["c"]);
    }

    #[tokio::test]
    async fn test_keyword_backend_ignores_stop_words() {
        let postings = vec![posting_with_skills(0, "the and of", "")];
        let report = KeywordOverlapMatcher
            .match_resume("the and of", &postings)
            .await
            .unwrap();
        assert!(report.matches.is_empty());
        assert_eq!(report.message.as_deref(), Some(NO_MATCH_MESSAGE));
    }

    #[test]
    fn test_backend_parses_from_config_string() {
        assert_eq!("tfidf".parse::<MatcherBackend>().unwrap(), MatcherBackend::Tfidf);
        assert_eq!(" Keyword ".parse::<MatcherBackend>().unwrap(), MatcherBackend::Keyword);
        assert!("bm25".parse::<MatcherBackend>().is_err());
    }
}
