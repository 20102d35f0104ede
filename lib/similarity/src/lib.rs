//! # Folio Similarity
//!
//! "Related items" rankers for Folio catalogs.
//!
//! Two independent strategies rank every other record against a reference:
//!
//! - **Attribute overlap** ([`OverlapRanker`]): token-set overlap over a curated
//!   list of metadata fields, accumulated per field
//! - **Term-vector cosine** ([`CosineRanker`]): cosine similarity of TF-IDF
//!   vectors produced offline by [`TermVectorBuilder`]
//!
//! Both share one ranking discipline: optional folder filter, score descending
//! with filename as tie-break, then a [`RankingPolicy`] cut.
//!
//! ## Example
//!
//! ```rust
//! use folio_core::{Record, Records};
//! use folio_similarity::{CosineRanker, OverlapRanker, TermVectorBuilder};
//!
//! let mut records = Records::new();
//! records.insert("a/x.jpg".into(), Record::new().with("year", "1920").with("elements", vec!["circle", "line"]));
//! records.insert("a/y.jpg".into(), Record::new().with("year", "1920").with("elements", vec!["circle"]));
//! records.insert("b/z.jpg".into(), Record::new().with("year", "1999").with("elements", vec!["square"]));
//!
//! let related = OverlapRanker::default().related("a/x.jpg", &records, None).unwrap();
//! assert_eq!(related[0].filename, "a/y.jpg");
//!
//! let vectors = TermVectorBuilder::new().build(&records).unwrap();
//! let related = CosineRanker::default().related("a/x.jpg", &vectors, None).unwrap();
//! assert_eq!(related[0].filename, "a/y.jpg");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Records   │────>│ TermVector   │────>│ CosineRanker │
//! │  (catalog)  │     │   Builder    │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!       │                                          │
//!       │             ┌──────────────┐             │
//!       └────────────>│ OverlapRanker│             │
//!                     └──────────────┘             │
//!                            │                     │
//!                     ┌──────────────────────────────┐
//!                     │  rank: filter, sort, policy  │
//!                     └──────────────────────────────┘
//! ```

pub mod cosine;
pub mod overlap;
pub mod rank;
pub mod tfidf;

pub use cosine::{cosine_similarity, CosineRanker};
pub use overlap::{field_tokens, overlap_score, OverlapRanker, OVERLAP_FIELDS};
pub use rank::{RankingPolicy, SimilarityResult};
pub use tfidf::{TermVector, TermVectorBuilder, TermVectors, TERM_VECTOR_FIELDS};
