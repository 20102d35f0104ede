//! Shared ranking discipline for the relatedness rankers
//!
//! Both rankers score every other record, optionally keep one folder, sort by
//! score descending (filename ascending on ties), and then cut the list with a
//! [`RankingPolicy`].

use folio_core::{folder_of, ALL_FOLDERS};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub filename: String,
    #[serde(alias = "similarity")]
    pub score: f32,
}

impl SimilarityResult {
    pub fn new(filename: impl Into<String>, score: f32) -> Self {
        Self {
            filename: filename.into(),
            score,
        }
    }
}

/// How a sorted result list is cut down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    /// Minimum score to keep
    pub threshold: f32,
    /// When no more than this many pass the threshold, ignore it and return
    /// this many top results instead
    pub fallback_top: Option<usize>,
    /// Hard cap on the returned list
    pub max_results: Option<usize>,
}

impl RankingPolicy {
    /// Attribute overlap: 0.15, falling back to the top 10
    pub const OVERLAP: Self = Self {
        threshold: 0.15,
        fallback_top: Some(10),
        max_results: None,
    };

    /// Term-vector cosine: 0.15, at most 100
    pub const COSINE: Self = Self {
        threshold: 0.15,
        fallback_top: None,
        max_results: Some(100),
    };

    /// Cut a list already sorted with [`sort_ranked`]
    pub fn apply(&self, sorted: Vec<SimilarityResult>) -> Vec<SimilarityResult> {
        let passing = sorted.iter().take_while(|r| r.score >= self.threshold).count();

        let keep = match self.fallback_top {
            Some(top) if passing <= top => top,
            _ => passing,
        };
        let keep = self.max_results.map_or(keep, |max| keep.min(max));

        let mut sorted = sorted;
        sorted.truncate(keep);
        sorted
    }
}

/// Score descending, then filename ascending
pub fn sort_ranked(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| compare_ranked(a, b));
}

fn compare_ranked(a: &SimilarityResult, b: &SimilarityResult) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then_with(|| a.filename.cmp(&b.filename))
}

/// Folder predicate; `None` or [`ALL_FOLDERS`] keeps everything
pub fn in_folder(filename: &str, folder: Option<&str>) -> bool {
    match folder {
        None | Some(ALL_FOLDERS) => true,
        Some(folder) => folder_of(filename) == Some(folder),
    }
}

/// Score `candidates` against a reference, drop the reference itself and
/// anything outside `folder`, then sort and cut with `policy`.
pub fn rank<'a, T, I, F>(
    reference: &str,
    candidates: I,
    folder: Option<&str>,
    policy: &RankingPolicy,
    mut score: F,
) -> Vec<SimilarityResult>
where
    T: 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
    F: FnMut(&T) -> f32,
{
    let mut results: Vec<SimilarityResult> = candidates
        .into_iter()
        .filter(|(filename, _)| filename.as_str() != reference && in_folder(filename, folder))
        .map(|(filename, item)| SimilarityResult::new(filename.as_str(), score(item)))
        .collect();

    sort_ranked(&mut results);
    policy.apply(results)
}
