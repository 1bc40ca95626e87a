//! On-disk cache of downloaded schemas, one file per schema URL.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::SchemaError;

/// Directory-backed schema cache.
///
/// Entries are named by the lowercase SHA-256 hex of the schema URL and
/// hold the raw schema bytes.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Open an existing cache directory.
    ///
    /// The directory is not created here; callers that want one created
    /// do so before constructing the validator.
    ///
    /// # Errors
    ///
    /// `SchemaError::CacheDir` if the directory cannot be inspected,
    /// `SchemaError::CacheNotDirectory` if the path is a file.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&dir).map_err(|source| SchemaError::CacheDir {
            path: dir.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(SchemaError::CacheNotDirectory { path: dir });
        }
        Ok(Self { dir })
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(cache_file_name(key))
    }

    /// Cached bytes for `key`, or `None` on a miss.
    ///
    /// Read failures other than a missing file are logged and treated as a
    /// miss so that a damaged cache degrades to re-downloading.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed reading schema cache entry: {e}");
                None
            }
        }
    }

    /// Store `bytes` for `key`.
    ///
    /// The entry is written to a temporary file in the cache directory and
    /// renamed into place, so readers never see a partial entry.
    pub fn set(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

fn cache_file_name(key: &str) -> String {
    Sha256::digest(key.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
