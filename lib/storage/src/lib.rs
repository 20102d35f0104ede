//! # Folio Storage
//!
//! File-backed persistence for Folio: the JSON dataset and the binary
//! term-vector snapshot produced by the offline TF-IDF pass.

pub mod dataset;
pub mod manager;
pub mod vectors;

pub use dataset::{checksum, DatasetFile};
pub use manager::{StorageManager, DATASET_FILE, VECTORS_FILE};
pub use vectors::{TermVectorSnapshot, VectorStore};
