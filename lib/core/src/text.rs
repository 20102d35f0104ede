//! Text analysis used by the index and the query resolver
//!
//! - [`tokenize`] splits already-lowercased text on non-word characters
//! - [`Stemmer`] reduces a word to its stem
//! - [`TokenSetSimilarity`] scores two strings on a 0-100 scale
//!
//! Both traits are implemented for plain closures so tests and callers can
//! swap in deterministic fakes.

use rust_stemmers::Algorithm;
use std::collections::BTreeSet;

/// Word characters: ASCII letters, digits and underscore
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split text on runs of non-word characters, dropping empty pieces
#[inline]
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c)).filter(|s| !s.is_empty())
}

pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

impl<F> Stemmer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn stem(&self, word: &str) -> String {
        self(word)
    }
}

/// English Snowball stemmer (Porter2). Some words stem differently than
/// under the original Porter algorithm.
pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn new() -> Self {
        Self {
            inner: rust_stemmers::Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SnowballStemmer")
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }
}

/// Order-insensitive fuzzy score between two strings, 0..=100
pub trait TokenSetSimilarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

impl<F> TokenSetSimilarity for F
where
    F: Fn(&str, &str) -> u8 + Send + Sync,
{
    fn score(&self, a: &str, b: &str) -> u8 {
        self(a, b)
    }
}

/// Token-set ratio.
///
/// Both inputs are normalized (lowercased, non-alphanumerics become spaces)
/// and split into word sets. With `s` the sorted intersection and `d1`/`d2`
/// the sorted differences, the score is the best [`ratio`] among
/// `(s, s+d1)`, `(s, s+d2)` and `(s+d1, s+d2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl TokenSetSimilarity for TokenSetRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        token_set_ratio(a, b)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
}

pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let join = |parts: Vec<&str>| parts.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied().collect());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_ab = format!("{} {}", sect, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", sect, diff_ba).trim().to_string();

    ratio(&sect, &combined_ab)
        .max(ratio(&sect, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

/// Indel similarity: `2 * lcs / (len(a) + len(b))`, scaled to 0..=100.
/// Empty inputs score 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let lcs = longest_common_subsequence(&a, &b);
    let total = (a.len() + b.len()) as f64;
    (200.0 * lcs as f64 / total).round() as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_non_word() {
        let tokens: Vec<&str> = tokenize(r#"{"title":"blue_rider","year":"1911"}"#).collect();
        assert_eq!(tokens, vec!["title", "blue_rider", "year", "1911"]);
    }

    #[test]
    fn test_tokenize_non_ascii_is_separator() {
        let tokens: Vec<&str> = tokenize("café noir").collect();
        assert_eq!(tokens, vec!["caf", "noir"]);
    }

    #[test]
    fn test_snowball_stemmer() {
        let stemmer = SnowballStemmer::new();
        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("colors"), "color");
        assert_eq!(stemmer.stem("circles"), stemmer.stem("circle"));
    }

    #[test]
    fn test_closure_stemmer() {
        let stemmer = |w: &str| w.trim_end_matches('s').to_string();
        assert_eq!(Stemmer::stem(&stemmer, "lines"), "line");
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("circle", "circle"), 100);
        assert_eq!(ratio("circle", "circles"), 92);
        assert_eq!(ratio("cat", "dog"), 0);
        assert_eq!(ratio("", "dog"), 0);
    }

    #[test]
    fn test_token_set_ratio_order_insensitive() {
        assert_eq!(token_set_ratio("blue rider", "rider blue"), 100);
        assert_eq!(token_set_ratio("blue", "blue rider"), 100);
        assert_eq!(token_set_ratio("Blue!", "blue"), 100);
    }

    #[test]
    fn test_token_set_ratio_underscore_splits() {
        // "dominant_colors" normalizes to {dominant, colors}
        let score = token_set_ratio("color", "dominant_colors");
        assert!(score <= 75, "score was {score}");
        assert_eq!(token_set_ratio("colors", "dominant_colors"), 100);
    }

    #[test]
    fn test_token_set_ratio_empty() {
        assert_eq!(token_set_ratio("", "anything"), 0);
        assert_eq!(token_set_ratio("---", "anything"), 0);
    }
}
