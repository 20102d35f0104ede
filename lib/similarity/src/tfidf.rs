//! TF-IDF term vectors
//!
//! Every record is flattened into one document built from a fixed field list.
//! Weights are `tf * idf` with `tf` the raw term count in the document and
//! `idf = 1 + ln(N / (1 + df))`. Vectors are corpus-relative: adding or
//! changing records means building them again.

use ahash::{AHashMap, AHashSet};
use folio_core::text::tokenize;
use folio_core::{Error, Record, Records, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Fields concatenated into a record's document, in order
pub const TERM_VECTOR_FIELDS: [&str; 10] = [
    "artist",
    "year",
    "title",
    "elements",
    "significance",
    "dominant_colors",
    "mood",
    "textures_and_lighting",
    "medium",
    "topics",
];

/// Terms never weighted
pub const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "am", "an", "and", "another", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "came", "can", "cannot", "come", "could", "did", "do", "does", "doing", "during",
    "each", "few", "for", "from", "further", "get", "got", "has", "had", "he", "have", "her",
    "here", "him", "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
    "like", "make", "many", "me", "might", "more", "most", "much", "must", "my", "myself",
    "never", "now", "of", "on", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "said", "same", "see", "should", "since", "so", "some", "still", "such", "take",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "way", "we", "well", "were", "what", "where", "when", "which", "while", "who", "whom",
    "with", "would", "why", "you", "your", "yours", "yourself", "a", "b", "c", "d", "e", "f",
    "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x",
    "y", "z", "$", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "_",
];

/// Sparse term -> weight vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermVector {
    weights: BTreeMap<String, f32>,
}

impl TermVector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, term: &str) -> Option<f32> {
        self.weights.get(term).copied()
    }

    pub fn insert(&mut self, term: impl Into<String>, weight: f32) {
        self.weights.insert(term.into(), weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Euclidean norm over all of this vector's terms
    pub fn norm(&self) -> f32 {
        self.weights.values().map(|w| w * w).sum::<f32>().sqrt()
    }

    /// Terms sorted by weight, heaviest first
    pub fn top_terms(&self, n: usize) -> Vec<(&str, f32)> {
        let mut terms: Vec<(&str, f32)> = self.iter().collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(String, f32)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// filename -> term vector, in dataset order
pub type TermVectors = IndexMap<String, TermVector>;

/// Offline TF-IDF pass over a snapshot of the catalog.
#[derive(Debug, Clone)]
pub struct TermVectorBuilder {
    fields: Vec<String>,
    threads: Option<usize>,
}

impl TermVectorBuilder {
    pub fn new() -> Self {
        Self {
            fields: TERM_VECTOR_FIELDS.iter().map(|f| f.to_string()).collect(),
            threads: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Cap the worker threads used for the pass; `None` uses rayon's default
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// The document string a record contributes
    pub fn document(&self, record: &Record) -> String {
        self.fields
            .iter()
            .map(|field| record.text(field))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Term counts of one document, stopwords removed
    pub fn term_counts(&self, record: &Record) -> AHashMap<String, u32> {
        let stopwords: AHashSet<&str> = STOPWORDS.iter().copied().collect();
        count_terms(&self.document(record), &stopwords)
    }

    pub fn build(&self, records: &Records) -> Result<TermVectors> {
        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .thread_name(|i| format!("tfidf-{i}"))
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let vectors = pool.install(|| self.build_parallel(records));
        tracing::info!(
            documents = vectors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "term vectors built"
        );
        Ok(vectors)
    }

    fn build_parallel(&self, records: &Records) -> TermVectors {
        let stopwords: AHashSet<&str> = STOPWORDS.iter().copied().collect();

        let counts: Vec<(&String, AHashMap<String, u32>)> = records
            .par_iter()
            .map(|(filename, record)| (filename, count_terms(&self.document(record), &stopwords)))
            .collect();

        let mut document_frequency: AHashMap<&str, u32> = AHashMap::new();
        for (_, terms) in &counts {
            for term in terms.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let total = counts.len() as f32;
        let idf = |term: &str| {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
            1.0 + (total / (1.0 + df)).ln()
        };

        counts
            .par_iter()
            .map(|(filename, terms)| {
                let vector = terms
                    .iter()
                    .map(|(term, tf)| (term.clone(), *tf as f32 * idf(term)))
                    .collect();
                ((*filename).clone(), vector)
            })
            .collect::<Vec<(String, TermVector)>>()
            .into_iter()
            .collect()
    }
}

impl Default for TermVectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn count_terms(document: &str, stopwords: &AHashSet<&str>) -> AHashMap<String, u32> {
    let lowered = document.to_lowercase();
    let mut counts: AHashMap<String, u32> = AHashMap::new();
    for term in tokenize(&lowered) {
        if stopwords.contains(term) {
            continue;
        }
        *counts.entry(term.to_string()).or_insert(0) += 1;
    }
    counts
}
