//! Query resolution over a [`ReverseIndex`]
//!
//! Three modes, picked from the query text:
//!
//! - no text: every record, in store order
//! - `"quoted phrase"`: substring test against the lowercase serialized metadata
//! - anything else: fuzzy. Keywords are stemmed; a record must contain a token
//!   stemming to every keyword, or contain any token whose token-set score
//!   against some keyword is above the fuzzy threshold. Stem matches are
//!   listed before records that only matched fuzzily.
//!
//! Results are then narrowed to a folder and paginated.

use crate::index::ReverseIndex;
use crate::record::{folder_of, Record, Records};
use crate::text::{SnowballStemmer, Stemmer, TokenSetRatio, TokenSetSimilarity};
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Folder value that disables folder filtering
pub const ALL_FOLDERS: &str = "all";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;

/// Index tokens must score strictly above this to count as fuzzy hits
pub const FUZZY_MATCH_THRESHOLD: u8 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, alias = "q")]
    pub text: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Query {
    fn default() -> Self {
        Self {
            text: None,
            folder: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Query without text: browse everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// How the text will be matched
    pub fn mode(&self) -> QueryMode<'_> {
        match self.text.as_deref() {
            None | Some("") => QueryMode::All,
            // a lone `"` opens and closes an empty phrase
            Some(text) if text.starts_with('"') && text.ends_with('"') => {
                QueryMode::Exact(text.get(1..text.len() - 1).unwrap_or(""))
            }
            Some(text) => QueryMode::Fuzzy(text),
        }
    }

    /// Folder filter, `None` when absent or set to [`ALL_FOLDERS`]
    pub fn folder_filter(&self) -> Option<&str> {
        self.folder.as_deref().filter(|f| *f != ALL_FOLDERS)
    }

    /// Validated `(offset, limit)`
    pub fn window(&self) -> Result<(usize, usize)> {
        if self.page < 1 {
            return Err(Error::InvalidParameter { name: "page", value: self.page });
        }
        if self.limit < 1 {
            return Err(Error::InvalidParameter { name: "limit", value: self.limit });
        }
        let page = usize::try_from(self.page - 1).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        Ok((page.saturating_mul(limit), limit))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode<'a> {
    All,
    Exact(&'a str),
    Fuzzy(&'a str),
}

/// A record joined with its filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub filename: String,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// Resolves queries against an index snapshot.
pub struct QueryResolver<S = SnowballStemmer, T = TokenSetRatio> {
    stemmer: S,
    similarity: T,
    fuzzy_threshold: u8,
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new(SnowballStemmer::new(), TokenSetRatio)
    }
}

impl<S: Stemmer, T: TokenSetSimilarity> QueryResolver<S, T> {
    pub fn new(stemmer: S, similarity: T) -> Self {
        Self {
            stemmer,
            similarity,
            fuzzy_threshold: FUZZY_MATCH_THRESHOLD,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: u8) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn fuzzy_threshold(&self) -> u8 {
        self.fuzzy_threshold
    }

    /// Resolve one page of results.
    pub fn resolve(&self, query: &Query, index: &ReverseIndex, records: &Records) -> Result<SearchPage> {
        let (offset, limit) = query.window()?;
        let candidates = self.candidates(query, index);
        let total = candidates.len();

        let results = candidates
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|filename| {
                records.get(filename).map(|record| SearchHit {
                    filename: filename.to_string(),
                    record: record.clone(),
                })
            })
            .collect();

        tracing::debug!(?query, total, "query resolved");
        Ok(SearchPage { results, total })
    }

    /// Full ordered candidate list before pagination
    pub fn candidates<'i>(&self, query: &Query, index: &'i ReverseIndex) -> Vec<&'i str> {
        let order = index.default_order().iter().map(String::as_str);

        let matched: Vec<&str> = match query.mode() {
            QueryMode::All => order.collect(),
            QueryMode::Exact(phrase) => {
                let phrase = phrase.to_lowercase();
                order
                    .filter(|f| index.haystack(f).is_some_and(|h| h.contains(&phrase)))
                    .collect()
            }
            QueryMode::Fuzzy(text) => {
                let matches = self.fuzzy_matches(text, index);
                let (stemmed, fuzzy_only): (Vec<&str>, Vec<&str>) = order
                    .filter(|f| matches.contains(f))
                    .partition(|f| matches.is_stem_match(f));
                stemmed.into_iter().chain(fuzzy_only).collect()
            }
        };

        match query.folder_filter() {
            Some(folder) => matched
                .into_iter()
                .filter(|f| folder_of(f) == Some(folder))
                .collect(),
            None => matched,
        }
    }

    fn keywords(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|word| self.stemmer.stem(word))
            .collect()
    }

    fn fuzzy_matches<'i>(&self, text: &str, index: &'i ReverseIndex) -> FuzzyMatches<'i> {
        let keywords = self.keywords(text);
        let mut stems: AHashMap<&str, String> = AHashMap::new();
        let mut stemmed: Option<AHashSet<&str>> = None;
        let mut fuzzy: AHashSet<&str> = AHashSet::new();

        for keyword in &keywords {
            let mut keyword_hits: AHashSet<&str> = AHashSet::new();

            for (token, files) in index.tokens() {
                let stem = stems.entry(token).or_insert_with(|| self.stemmer.stem(token));
                if stem.as_str() == keyword.as_str() {
                    keyword_hits.extend(files.iter().map(String::as_str));
                }
                if self.similarity.score(keyword, token) > self.fuzzy_threshold {
                    fuzzy.extend(files.iter().map(String::as_str));
                }
            }

            stemmed = Some(match stemmed {
                None => keyword_hits,
                Some(prev) => prev.intersection(&keyword_hits).copied().collect(),
            });
        }

        FuzzyMatches { stemmed, fuzzy }
    }
}

struct FuzzyMatches<'i> {
    // None: no keywords, nothing was narrowed
    stemmed: Option<AHashSet<&'i str>>,
    fuzzy: AHashSet<&'i str>,
}

impl FuzzyMatches<'_> {
    fn is_stem_match(&self, filename: &str) -> bool {
        self.stemmed.as_ref().map_or(true, |s| s.contains(filename))
    }

    fn contains(&self, filename: &str) -> bool {
        self.is_stem_match(filename) || self.fuzzy.contains(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_s(word: &str) -> String {
        word.strip_suffix('s').unwrap_or(word).to_string()
    }

    fn never(_: &str, _: &str) -> u8 {
        0
    }

    fn corpus() -> Records {
        let mut records = Records::new();
        records.insert(
            "ars/one.jpg".into(),
            Record::new().with("title", "Musical Notation").with("elements", vec!["circles", "lines"]),
        );
        records.insert(
            "ars/two.jpg".into(),
            Record::new().with("title", "Red Circle").with("elements", vec!["circle"]),
        );
        records.insert(
            "bau/three.jpg".into(),
            Record::new().with("title", "Lines and grids").with("elements", vec!["grid", "line"]),
        );
        records.insert(
            "bau/four.jpg".into(),
            Record::new().with("title", "Square").with("mood", vec!["calm"]),
        );
        records
    }

    fn filenames(page: &SearchPage) -> Vec<&str> {
        page.results.iter().map(|h| h.filename.as_str()).collect()
    }

    #[test]
    fn test_no_text_returns_default_order() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::all(), &index, &records).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(filenames(&page), vec!["ars/one.jpg", "ars/two.jpg", "bau/three.jpg", "bau/four.jpg"]);

        let empty = resolver.resolve(&Query::new(""), &index, &records).unwrap();
        assert_eq!(empty.total, 4);
    }

    #[test]
    fn test_exact_phrase_is_substring() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::new("\"notation\""), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg"]);

        let page = resolver.resolve(&Query::new("\"RED CIRC\""), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/two.jpg"]);

        let page = resolver.resolve(&Query::new("\"circle\""), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg", "ars/two.jpg"]);
    }

    #[test]
    fn test_fuzzy_stem_intersection() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::new("circles"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg", "ars/two.jpg"]);

        let page = resolver.resolve(&Query::new("red circle"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/two.jpg"]);

        let page = resolver.resolve(&Query::new("line"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg", "bau/three.jpg"]);

        let page = resolver.resolve(&Query::new("Line Grid"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["bau/three.jpg"]);
    }

    #[test]
    fn test_more_keywords_never_widen_stem_matches() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let mut previous = usize::MAX;
        for text in ["title", "title elements", "title elements circle", "title elements circle red"] {
            let matches = resolver.fuzzy_matches(text, &index);
            let size = matches.stemmed.as_ref().map(|s| s.len()).unwrap();
            assert!(size <= previous, "{text} widened to {size}");
            previous = size;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn test_fuzzy_hits_are_unioned() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let grids_only = |_: &str, token: &str| -> u8 { if token == "grid" { 100 } else { 0 } };
        let resolver = QueryResolver::new(strip_s, grids_only);

        // "red" only stem-matches ars/two; the fuzzy scorer adds bau/three
        let page = resolver.resolve(&Query::new("red"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/two.jpg", "bau/three.jpg"]);
    }

    #[test]
    fn test_stem_matches_precede_fuzzy_only_matches() {
        let mut records = Records::new();
        records.insert("a/fuzzy.jpg".into(), Record::new().with("title", "circlet"));
        records.insert("a/stem.jpg".into(), Record::new().with("title", "circles"));
        records.insert("a/both.jpg".into(), Record::new().with("title", "circle circlet"));
        let index = ReverseIndex::build(&records);
        let circlet = |_: &str, token: &str| -> u8 { if token == "circlet" { 90 } else { 0 } };
        let resolver = QueryResolver::new(strip_s, circlet);

        let page = resolver.resolve(&Query::new("circle"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["a/stem.jpg", "a/both.jpg", "a/fuzzy.jpg"]);
        assert_eq!(page.total, 3);

        // the fuzzy-only record lands on the last page
        let last = resolver.resolve(&Query::new("circle").page(2, 2), &index, &records).unwrap();
        assert_eq!(filenames(&last), vec!["a/fuzzy.jpg"]);
    }

    #[test]
    fn test_lone_quote_is_empty_phrase() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::new("\""), &index, &records).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(filenames(&page), vec!["ars/one.jpg", "ars/two.jpg", "bau/three.jpg", "bau/four.jpg"]);
    }

    #[test]
    fn test_fuzzy_threshold_is_strict() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let square = |_: &str, token: &str| -> u8 { if token == "square" { 75 } else { 0 } };

        let resolver = QueryResolver::new(strip_s, square);
        let page = resolver.resolve(&Query::new("zzz"), &index, &records).unwrap();
        assert_eq!(page.total, 0);

        let resolver = QueryResolver::new(strip_s, square).with_fuzzy_threshold(74);
        let page = resolver.resolve(&Query::new("zzz"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["bau/four.jpg"]);
    }

    #[test]
    fn test_default_resolver_matches_misspelling() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::default();

        let page = resolver.resolve(&Query::new("notaton"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg"]);
    }

    #[test]
    fn test_whitespace_only_query_matches_everything() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::new("   "), &index, &records).unwrap();
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_folder_filter_composes() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::all().in_folder("bau"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["bau/three.jpg", "bau/four.jpg"]);

        let page = resolver.resolve(&Query::new("\"line\"").in_folder("ars"), &index, &records).unwrap();
        assert_eq!(filenames(&page), vec!["ars/one.jpg"]);

        let page = resolver.resolve(&Query::new("title").in_folder("all"), &index, &records).unwrap();
        assert_eq!(page.total, 4);

        let page = resolver.resolve(&Query::all().in_folder("ar"), &index, &records).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_pagination_windows() {
        let mut records = Records::new();
        for i in 0..25 {
            records.insert(format!("f/{i:02}.jpg"), Record::new().with("title", "same"));
        }
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let wide = resolver.resolve(&Query::all().page(1, 20), &index, &records).unwrap();
        let second = resolver.resolve(&Query::all().page(2, 10), &index, &records).unwrap();
        assert_eq!(wide.total, 25);
        assert_eq!(second.total, 25);
        assert_eq!(second.results, wide.results[10..20].to_vec());

        let tail = resolver.resolve(&Query::all().page(3, 10), &index, &records).unwrap();
        assert_eq!(tail.results.len(), 5);

        let past = resolver.resolve(&Query::all().page(9, 10), &index, &records).unwrap();
        assert!(past.results.is_empty());
        assert_eq!(past.total, 25);
    }

    #[test]
    fn test_invalid_pagination() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let err = resolver.resolve(&Query::all().page(0, 10), &index, &records).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "page", value: 0 }));

        let err = resolver.resolve(&Query::all().page(1, -5), &index, &records).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "limit", value: -5 }));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let records = corpus();
        let index = ReverseIndex::build(&records);
        let resolver = QueryResolver::new(strip_s, never);

        let page = resolver.resolve(&Query::all().page(i64::MAX, i64::MAX), &index, &records).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_query_modes() {
        assert_eq!(Query::all().mode(), QueryMode::All);
        assert_eq!(Query::new("\"a b\"").mode(), QueryMode::Exact("a b"));
        assert_eq!(Query::new("\"\"").mode(), QueryMode::Exact(""));
        assert_eq!(Query::new("\"").mode(), QueryMode::Exact(""));
        assert_eq!(Query::new("a \"b\"").mode(), QueryMode::Fuzzy("a \"b\""));
    }

    #[test]
    fn test_search_hit_flattens_record() {
        let hit = SearchHit {
            filename: "a/x.jpg".into(),
            record: Record::new().with("year", "1920"),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json, serde_json::json!({"filename": "a/x.jpg", "year": "1920"}));
    }
}
