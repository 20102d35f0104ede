//! Attribute-overlap similarity
//!
//! Each curated field is turned into a token set per record. Intersections and
//! unions are counted per field and summed over all fields; the score is the
//! summed intersection over the summed union. This is deliberately not a
//! global Jaccard index over the merged sets.

use crate::rank::{rank, RankingPolicy, SimilarityResult};
use ahash::AHashSet;
use folio_core::{AttributeValue, Error, Record, Records, Result};

/// Fields compared by [`overlap_score`]
pub const OVERLAP_FIELDS: [&str; 7] = [
    "year",
    "elements",
    "significance",
    "dominant_colors",
    "mood",
    "textures_and_lighting",
    "topics",
];

/// Token set of one field value.
///
/// List items are lowercased and trimmed one by one. Scalars are split on
/// commas and whitespace. Blank scalars and non-scalar JSON give no tokens.
pub fn field_tokens(value: Option<&AttributeValue>) -> AHashSet<String> {
    match value {
        None => AHashSet::new(),
        Some(AttributeValue::List(items)) => items
            .iter()
            .map(|item| item.to_lowercase().trim().to_string())
            .collect(),
        Some(value) if value.is_blank() => AHashSet::new(),
        Some(value) => value
            .as_scalar()
            .map(|text| {
                text.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Overlap score over [`OVERLAP_FIELDS`], in `[0, 1]`
pub fn overlap_score(a: &Record, b: &Record) -> f32 {
    overlap_score_over(a, b, &OVERLAP_FIELDS)
}

pub fn overlap_score_over<S: AsRef<str>>(a: &Record, b: &Record, fields: &[S]) -> f32 {
    let mut intersection = 0usize;
    let mut union = 0usize;

    for field in fields {
        let field = field.as_ref();
        let tokens_a = field_tokens(a.get(field));
        let tokens_b = field_tokens(b.get(field));

        intersection += tokens_a.intersection(&tokens_b).count();
        union += tokens_a.union(&tokens_b).count();
    }

    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Ranks records by attribute overlap with a reference record
#[derive(Debug, Clone)]
pub struct OverlapRanker {
    fields: Vec<String>,
    policy: RankingPolicy,
}

impl OverlapRanker {
    pub fn new(policy: RankingPolicy) -> Self {
        Self {
            fields: OVERLAP_FIELDS.iter().map(|f| f.to_string()).collect(),
            policy,
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    /// Related records for `filename`, or `InvalidReference` if it is unknown
    pub fn related(&self, filename: &str, records: &Records, folder: Option<&str>) -> Result<Vec<SimilarityResult>> {
        let reference = records
            .get(filename)
            .ok_or_else(|| Error::InvalidReference(filename.to_string()))?;

        let related = rank(filename, records, folder, &self.policy, |other: &Record| {
            overlap_score_over(reference, other, &self.fields)
        });
        tracing::debug!(filename, related = related.len(), "overlap ranking");
        Ok(related)
    }
}

impl Default for OverlapRanker {
    fn default() -> Self {
        Self::new(RankingPolicy::OVERLAP)
    }
}
