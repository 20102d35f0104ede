// Term-vector snapshots: the output of an offline TF-IDF pass, kept until the next one
use anyhow::{anyhow, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use folio_similarity::TermVectors;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVectorSnapshot {
    /// RFC 3339 build time
    pub created_at: String,
    /// Checksum of the dataset the vectors were built from
    pub corpus_checksum: String,
    pub vectors: TermVectors,
}

impl TermVectorSnapshot {
    pub fn new(vectors: TermVectors, corpus_checksum: String) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            corpus_checksum,
            vectors,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Whether these vectors were built from a dataset with this checksum
    pub fn is_current(&self, corpus_checksum: &str) -> bool {
        self.corpus_checksum == corpus_checksum
    }
}

pub struct VectorStore {
    path: PathBuf,
}

impl VectorStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, `None` when it was never built
    pub fn load(&self) -> Result<Option<TermVectorSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read(&self.path)?;
        let snapshot: TermVectorSnapshot = bincode::deserialize(&data)
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &TermVectorSnapshot) -> Result<()> {
        let data = bincode::serialize(snapshot)
            .map_err(|e| anyhow!("Serialization error: {}", e))?;
        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| anyhow!("writing term vectors {:?}: {}", self.path, e))?;
        Ok(())
    }
}
