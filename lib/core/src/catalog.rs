use crate::index::ReverseIndex;
use crate::query::{Query, QueryResolver, SearchHit, SearchPage};
use crate::record::{folder_of, Record, Records};
use crate::text::{Stemmer, TokenSetSimilarity};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Immutable view of the catalog: records plus the index derived from them.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    records: Records,
    index: ReverseIndex,
}

impl CatalogSnapshot {
    pub fn build(records: Records) -> Self {
        let started = Instant::now();
        let index = ReverseIndex::build(&records);
        tracing::debug!(
            records = records.len(),
            tokens = index.vocabulary_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reverse index built"
        );
        Self { records, index }
    }

    #[inline]
    pub fn records(&self) -> &Records {
        &self.records
    }

    #[inline]
    pub fn index(&self) -> &ReverseIndex {
        &self.index
    }

    #[inline]
    pub fn get(&self, filename: &str) -> Option<&Record> {
        self.records.get(filename)
    }

    #[inline]
    pub fn contains(&self, filename: &str) -> bool {
        self.records.contains_key(filename)
    }

    /// Record joined with its filename, or `InvalidReference`
    pub fn hit(&self, filename: &str) -> Result<SearchHit> {
        self.get(filename)
            .map(|record| SearchHit {
                filename: filename.to_string(),
                record: record.clone(),
            })
            .ok_or_else(|| Error::InvalidReference(filename.to_string()))
    }

    /// Sorted, de-duplicated folders of all filenames that have one
    pub fn folders(&self) -> Vec<String> {
        self.records
            .keys()
            .filter_map(|f| folder_of(f))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn search<S: Stemmer, T: TokenSetSimilarity>(
        &self,
        resolver: &QueryResolver<S, T>,
        query: &Query,
    ) -> Result<SearchPage> {
        resolver.resolve(query, &self.index, &self.records)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The record store.
///
/// Readers take a cheap [`Arc`] of the current snapshot. Writers rebuild a
/// complete snapshot off to the side and swap it in, so a reader never sees
/// records and index out of step. Writers are serialized among themselves.
pub struct Catalog {
    current: RwLock<Arc<CatalogSnapshot>>,
    writer: Mutex<()>,
}

impl Catalog {
    pub fn new(records: Records) -> Self {
        let snapshot = CatalogSnapshot::build(records);
        tracing::info!(records = snapshot.len(), "catalog loaded");
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot; stays valid even if the catalog changes afterwards
    #[inline]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Replace an existing record and rebuild the index before publishing.
    pub fn replace(&self, filename: &str, record: Record) -> Result<Arc<CatalogSnapshot>> {
        let _guard = self.writer.lock();
        let current = self.snapshot();
        if !current.contains(filename) {
            return Err(Error::InvalidReference(filename.to_string()));
        }

        let mut records = current.records.clone();
        records.insert(filename.to_string(), record);
        tracing::info!(filename, "record replaced");
        Ok(self.publish(records))
    }

    /// Swap in an entirely new record set
    pub fn reload(&self, records: Records) -> Arc<CatalogSnapshot> {
        let _guard = self.writer.lock();
        self.publish(records)
    }

    /// Rebuild the index from the current records
    pub fn rebuild(&self) -> Arc<CatalogSnapshot> {
        let _guard = self.writer.lock();
        let records = self.snapshot().records.clone();
        self.publish(records)
    }

    fn publish(&self, records: Records) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(CatalogSnapshot::build(records));
        *self.current.write() = snapshot.clone();
        snapshot
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Records::new())
    }
}
