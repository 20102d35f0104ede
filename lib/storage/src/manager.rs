use crate::dataset::{checksum, DatasetFile};
use crate::vectors::{TermVectorSnapshot, VectorStore};
use folio_core::{Catalog, Error, Records, Result};
use folio_similarity::TermVectors;
use std::path::{Path, PathBuf};

pub const DATASET_FILE: &str = "data.json";
pub const VECTORS_FILE: &str = "tfidf_vectors.bin";

/// Owns the on-disk layout of one data directory
pub struct StorageManager {
    data_dir: PathBuf,
    dataset: DatasetFile,
    vectors: VectorStore,
}

impl StorageManager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            dataset: DatasetFile::new(data_dir.join(DATASET_FILE)),
            vectors: VectorStore::new(data_dir.join(VECTORS_FILE)),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn has_dataset(&self) -> bool {
        self.dataset.exists()
    }

    pub fn load_records(&self) -> Result<Records> {
        let records = self
            .dataset
            .load()
            .map_err(|e| Error::Storage(format!("{:#}", e)))?;
        tracing::info!(records = records.len(), path = ?self.dataset.path(), "dataset loaded");
        Ok(records)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.load_records()?))
    }

    /// Persist the catalog's current records
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        let snapshot = catalog.snapshot();
        self.save_records(snapshot.records())
    }

    pub fn save_records(&self, records: &Records) -> Result<()> {
        self.dataset
            .save(records)
            .map_err(|e| Error::Persistence(format!("{:#}", e)))?;
        tracing::debug!(records = records.len(), "dataset saved");
        Ok(())
    }

    /// Load term vectors, warning when they were built from different records.
    /// Empty when no vectors were ever built.
    pub fn load_vectors(&self, records: &Records) -> Result<TermVectors> {
        let snapshot = match self
            .vectors
            .load()
            .map_err(|e| Error::Persistence(format!("{:#}", e)))?
        {
            Some(snapshot) => snapshot,
            None => {
                tracing::warn!(path = ?self.vectors.path(), "no term vectors found, run build-vectors");
                return Ok(TermVectors::new());
            }
        };

        let current = checksum(records).map_err(|e| Error::Serialization(e.to_string()))?;
        if !snapshot.is_current(&current) {
            tracing::warn!(
                created_at = %snapshot.created_at,
                "term vectors are stale, rebuild them to reflect the current dataset"
            );
        }
        tracing::info!(vectors = snapshot.vectors.len(), "term vectors loaded");
        Ok(snapshot.vectors)
    }

    pub fn save_vectors(&self, records: &Records, vectors: TermVectors) -> Result<TermVectorSnapshot> {
        let corpus_checksum = checksum(records).map_err(|e| Error::Serialization(e.to_string()))?;
        let snapshot = TermVectorSnapshot::new(vectors, corpus_checksum);
        self.vectors
            .save(&snapshot)
            .map_err(|e| Error::Persistence(format!("{:#}", e)))?;
        tracing::info!(vectors = snapshot.vectors.len(), path = ?self.vectors.path(), "term vectors saved");
        Ok(snapshot)
    }
}
