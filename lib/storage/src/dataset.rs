// Dataset file: a JSON object of filename -> record, order preserved
use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use folio_core::Records;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct DatasetFile {
    path: PathBuf,
}

impl DatasetFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Records> {
        let data = fs::read(&self.path)
            .with_context(|| format!("reading dataset {:?}", self.path))?;
        let records: Records = serde_json::from_slice(&data)
            .with_context(|| format!("parsing dataset {:?}", self.path))?;
        Ok(records)
    }

    /// Write the dataset pretty-printed, replacing the file atomically
    pub fn save(&self, records: &Records) -> Result<()> {
        let data = serde_json::to_vec_pretty(records)?;
        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| anyhow::anyhow!("writing dataset {:?}: {}", self.path, e))?;
        Ok(())
    }
}

/// SHA-256 over the canonical JSON of a record set, hex encoded
pub fn checksum(records: &Records) -> Result<String> {
    let data = serde_json::to_vec(records)?;
    Ok(format!("{:x}", Sha256::digest(&data)))
}
