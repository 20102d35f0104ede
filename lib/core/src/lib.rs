//! # Folio Core
//!
//! Core library for the Folio metadata search engine.
//!
//! This crate provides the catalog and everything needed to search it:
//!
//! - [`Record`] - Metadata attributes of one image, keyed by filename
//! - [`ReverseIndex`] - Token to filenames index over serialized metadata
//! - [`QueryResolver`] - Exact phrase and fuzzy (stemmed + token-set) search
//! - [`Catalog`] - Record store publishing immutable, fully indexed snapshots
//!
//! ## Example
//!
//! ```rust
//! use folio_core::{Catalog, Query, QueryResolver, Record, Records};
//!
//! let mut records = Records::new();
//! records.insert(
//!     "bauhaus/grid.jpg".to_string(),
//!     Record::new().with("title", "Grid Study").with("elements", vec!["grid", "line"]),
//! );
//! let catalog = Catalog::new(records);
//!
//! let resolver = QueryResolver::default();
//! let page = catalog.snapshot().search(&resolver, &Query::new("grids")).unwrap();
//! assert_eq!(page.total, 1);
//! ```

pub mod catalog;
pub mod error;
pub mod index;
pub mod query;
pub mod record;
pub mod text;

pub use catalog::{Catalog, CatalogSnapshot};
pub use error::{Error, Result};
pub use index::ReverseIndex;
pub use query::{Query, QueryMode, QueryResolver, SearchHit, SearchPage, ALL_FOLDERS};
pub use record::{folder_of, AttributeValue, Record, Records};
pub use text::{SnowballStemmer, Stemmer, TokenSetRatio, TokenSetSimilarity};
