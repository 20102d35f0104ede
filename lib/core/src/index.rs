// Reverse index over serialized record metadata
use crate::record::{Record, Records};
use crate::text::tokenize;
use ahash::{AHashMap, AHashSet};

#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    // token -> filenames whose metadata contains it
    postings: AHashMap<String, AHashSet<String>>,
    // filename -> lowercase serialized metadata
    haystacks: AHashMap<String, String>,
    // every filename once, in store order
    default_order: Vec<String>,
}

impl ReverseIndex {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the full record set
    pub fn build(records: &Records) -> Self {
        let mut index = Self::new();
        for (filename, record) in records {
            index.insert(filename, record);
        }
        index
    }

    fn insert(&mut self, filename: &str, record: &Record) {
        let haystack = record.search_text();

        for token in tokenize(&haystack) {
            match self.postings.get_mut(token) {
                Some(files) => {
                    if !files.contains(filename) {
                        files.insert(filename.to_string());
                    }
                }
                None => {
                    let mut files = AHashSet::new();
                    files.insert(filename.to_string());
                    self.postings.insert(token.to_string(), files);
                }
            }
        }

        if self.haystacks.insert(filename.to_string(), haystack).is_none() {
            self.default_order.push(filename.to_string());
        }
    }

    /// Filenames indexed under `token`
    #[inline]
    pub fn postings(&self, token: &str) -> Option<&AHashSet<String>> {
        self.postings.get(token)
    }

    /// Every distinct token with its filenames, in no particular order
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &AHashSet<String>)> {
        self.postings.iter().map(|(token, files)| (token.as_str(), files))
    }

    /// Lowercase serialized metadata of a record
    #[inline]
    pub fn haystack(&self, filename: &str) -> Option<&str> {
        self.haystacks.get(filename).map(String::as_str)
    }

    /// All filenames in store order, used when a query has no text
    #[inline]
    pub fn default_order(&self) -> &[String] {
        &self.default_order
    }

    #[inline]
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.default_order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_order.is_empty()
    }
}
