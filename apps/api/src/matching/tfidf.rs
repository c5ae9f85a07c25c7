//! TF-IDF vectorization over a small in-memory corpus.
//!
//! Weighting follows the usual smoothed scheme:
//! - tf = raw term count in the document
//! - idf = ln((1 + n) / (1 + df)) + 1
//! - each row is L2-normalized, so the dot product of two rows is their cosine

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::matching::tokenizer::content_tokens;

#[derive(Debug, Error, PartialEq)]
pub enum VectorizeError {
    #[error("no documents to vectorize")]
    NoDocuments,

    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,
}

/// Sparse row vector: `(term index, weight)` pairs sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine of the angle between two vectors. Zero vectors are dissimilar to everything.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// Result of fitting a vectorizer: the joint vocabulary and one row per input document.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
    pub rows: Vec<SparseVector>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    /// Builds the vocabulary from every document and returns their weighted rows,
    /// in input order. Vocabulary indices follow sorted term order.
    pub fn fit_transform(&self, docs: &[&str]) -> Result<TfidfMatrix, VectorizeError> {
        if docs.is_empty() {
            return Err(VectorizeError::NoDocuments);
        }

        let counts: Vec<HashMap<String, u32>> = docs
            .iter()
            .map(|doc| {
                let mut tf = HashMap::new();
                for token in content_tokens(doc) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let n = docs.len() as f64;
        let vocabulary: BTreeMap<String, usize> = doc_freq
            .keys()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        let idf: Vec<f64> = doc_freq
            .values()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|tf| {
                let mut entries: Vec<(usize, f64)> = tf
                    .into_iter()
                    .map(|(term, count)| {
                        let idx = vocabulary[&term];
                        (idx, count as f64 * idf[idx])
                    })
                    .collect();
                entries.sort_by_key(|(idx, _)| *idx);
                l2_normalize(&mut entries);
                SparseVector { entries }
            })
            .collect();

        Ok(TfidfMatrix {
            vocabulary,
            idf,
            rows,
        })
    }
}

fn l2_normalize(entries: &mut [(usize, f64)]) {
    let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
    }
}
