//! # Folio
//!
//! An in-memory metadata search and relatedness engine for image catalogs.
//!
//! Folio indexes a catalog of `filename -> metadata` records and answers two
//! kinds of questions about it:
//!
//! - **Search**: exact phrase (`"red circle"`) or fuzzy keyword queries, with
//!   stemming and token-set similarity, filtered by folder and paginated
//! - **Related items**: the records most similar to a given one, by attribute
//!   overlap or by TF-IDF cosine similarity
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! folio --data-dir ./data search "bauhaus circle" --limit 5
//! folio --data-dir ./data build-vectors
//! folio --data-dir ./data related bauhaus/grid.jpg --method term-vector
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use folio::prelude::*;
//!
//! let mut records = Records::new();
//! records.insert("a/x.jpg".into(), Record::new().with("year", "1920").with("elements", vec!["circle", "line"]));
//! records.insert("a/y.jpg".into(), Record::new().with("year", "1920").with("elements", vec!["circle"]));
//! records.insert("b/z.jpg".into(), Record::new().with("year", "1999").with("elements", vec!["square"]));
//!
//! let engine = Engine::from_records(records);
//!
//! let page = engine.search(&Query::new("circles").in_folder("a")).unwrap();
//! assert_eq!(page.total, 2);
//!
//! let related = engine.related("a/x.jpg", None, RelatedMethod::Overlap).unwrap();
//! assert_eq!(related.related[0].filename, "a/y.jpg");
//! ```
//!
//! ## Crate Structure
//!
//! - [`folio-core`](folio_core) - Records, reverse index, query resolver, catalog
//! - [`folio-similarity`](folio_similarity) - Overlap and TF-IDF cosine rankers
//! - [`folio-storage`](folio_storage) - Dataset and term-vector files

pub mod engine;

pub use engine::{Engine, EngineConfig, FolderList, RelatedMethod, RelatedResponse};

// Re-export core types
pub use folio_core::{
    AttributeValue, Catalog, CatalogSnapshot, Error, Query, QueryResolver, Record, Records, Result,
    ReverseIndex, SearchHit, SearchPage, ALL_FOLDERS,
};

// Re-export similarity
pub use folio_similarity::{
    CosineRanker, OverlapRanker, RankingPolicy, SimilarityResult, TermVector, TermVectorBuilder, TermVectors,
};

// Re-export storage
pub use folio_storage::{StorageManager, TermVectorSnapshot};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, Engine, EngineConfig, Error, FolderList, Query, Record, Records, RelatedMethod,
        RelatedResponse, Result, SearchHit, SearchPage, SimilarityResult, StorageManager,
    };
}
