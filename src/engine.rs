//! The engine: a catalog plus everything that answers questions about it

use folio_core::{
    Catalog, Error, Query, QueryResolver, Record, Records, Result, SearchHit, SearchPage, ALL_FOLDERS,
};
use folio_similarity::{CosineRanker, OverlapRanker, RankingPolicy, SimilarityResult, TermVectorBuilder, TermVectors};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token-set score a fuzzy match must exceed (0-100)
    pub fuzzy_threshold: u8,
    pub overlap: RankingPolicy,
    pub cosine: RankingPolicy,
    /// Worker threads for term-vector builds; `None` uses all cores
    pub vector_threads: Option<usize>,
    /// Folder selected when the caller names none
    pub default_folder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: folio_core::query::FUZZY_MATCH_THRESHOLD,
            overlap: RankingPolicy::OVERLAP,
            cosine: RankingPolicy::COSINE,
            vector_threads: None,
            default_folder: ALL_FOLDERS.to_string(),
        }
    }
}

/// Which ranker answers a relatedness request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RelatedMethod {
    /// Attribute overlap over curated fields
    Overlap,
    /// Cosine similarity of TF-IDF vectors
    TermVector,
    /// Term vectors, falling back to overlap when the reference has none
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedResponse {
    pub related: Vec<SimilarityResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderList {
    pub folders: Vec<String>,
    pub default: String,
}

pub struct Engine {
    catalog: Catalog,
    vectors: RwLock<Arc<TermVectors>>,
    resolver: QueryResolver,
    overlap: OverlapRanker,
    cosine: CosineRanker,
    config: EngineConfig,
}

impl Engine {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            vectors: RwLock::new(Arc::new(TermVectors::new())),
            resolver: QueryResolver::default().with_fuzzy_threshold(config.fuzzy_threshold),
            overlap: OverlapRanker::new(config.overlap),
            cosine: CosineRanker::new(config.cosine),
            config,
        }
    }

    pub fn from_records(records: Records) -> Self {
        Self::new(Catalog::new(records), EngineConfig::default())
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current term vectors; empty until built or loaded
    pub fn vectors(&self) -> Arc<TermVectors> {
        self.vectors.read().clone()
    }

    pub fn set_vectors(&self, vectors: TermVectors) {
        *self.vectors.write() = Arc::new(vectors);
    }

    pub fn search(&self, query: &Query) -> Result<SearchPage> {
        self.catalog.snapshot().search(&self.resolver, query)
    }

    /// Records related to `filename`, optionally restricted to one folder
    pub fn related(&self, filename: &str, folder: Option<&str>, method: RelatedMethod) -> Result<RelatedResponse> {
        let snapshot = self.catalog.snapshot();
        if !snapshot.contains(filename) {
            return Err(Error::InvalidReference(filename.to_string()));
        }

        let related = match method {
            RelatedMethod::Overlap => self.overlap.related(filename, snapshot.records(), folder)?,
            RelatedMethod::TermVector => self.cosine.related(filename, &self.vectors(), folder)?,
            RelatedMethod::Auto => match self.cosine.related(filename, &self.vectors(), folder) {
                Err(Error::VectorUnavailable(_)) => {
                    tracing::warn!(filename, "no term vector, falling back to attribute overlap");
                    self.overlap.related(filename, snapshot.records(), folder)?
                }
                other => other?,
            },
        };

        Ok(RelatedResponse { related })
    }

    pub fn folders(&self) -> FolderList {
        FolderList {
            folders: self.catalog.snapshot().folders(),
            default: self.config.default_folder.clone(),
        }
    }

    pub fn show(&self, filename: &str) -> Result<SearchHit> {
        self.catalog.snapshot().hit(filename)
    }

    /// Replace an existing record; the index is rebuilt before this returns.
    /// Term vectors are left as they are until the next build.
    pub fn replace(&self, filename: &str, record: Record) -> Result<()> {
        self.catalog.replace(filename, record)?;
        Ok(())
    }

    pub fn rebuild(&self) {
        self.catalog.rebuild();
    }

    /// Build term vectors for the current records and start serving them
    pub fn build_vectors(&self) -> Result<Arc<TermVectors>> {
        let snapshot = self.catalog.snapshot();
        let vectors = TermVectorBuilder::new()
            .with_threads(self.config.vector_threads)
            .build(snapshot.records())?;

        let vectors = Arc::new(vectors);
        *self.vectors.write() = vectors.clone();
        Ok(vectors)
    }
}
