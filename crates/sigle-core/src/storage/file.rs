use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::SessionStorage;

/// Storage file name in cache directory
const STORAGE_FILE: &str = "storage.json";

/// String map persisted as a single JSON object on disk.
pub struct FileStorage {
    cache_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            lock: Mutex::new(()),
        }
    }

    fn storage_path(&self) -> PathBuf {
        self.cache_dir.join(STORAGE_FILE)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let path = self.storage_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Next write replaces the unreadable file
                warn!(path = %path.display(), error = %e, "Storage file is corrupt, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Replace the storage file atomically: write a sibling temp file, then
    /// rename it over the old one.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let path = self.storage_path();
        std::fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("Failed to create directory: {}", self.cache_dir.display()))?;

        let contents = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)
            .with_context(|| format!("Failed to create temp file in {}", self.cache_dir.display()))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write storage file: {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace storage file: {}", path.display()))?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
            debug!(key, "Removed value");
        }
        Ok(())
    }
}
