//! Device-local persistent storage.
//!
//! Plays the role `localStorage` plays in a browser: a flat string map the
//! coordinator uses to keep the serialized DID session between runs.
//!
//! Backends:
//! - `MemoryStorage`: process-local, for tests and embedders
//! - `FileStorage`: JSON file in the cache directory
//! - `KeyringStorage`: OS keychain entries

pub mod file;
pub mod keyring;

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

pub use self::file::FileStorage;
pub use self::keyring::KeyringStorage;

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing whatever was there
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("didsession").unwrap(), None);

        storage.set("didsession", "one").unwrap();
        storage.set("didsession", "two").unwrap();
        assert_eq!(storage.get("didsession").unwrap().as_deref(), Some("two"));

        storage.remove("didsession").unwrap();
        storage.remove("didsession").unwrap();
        assert_eq!(storage.get("didsession").unwrap(), None);
    }
}
