use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::StoreError;
use crate::store::KeyValueStore;

/// Key-value store persisted as one JSON object on disk.
///
/// Every call reads the file, so a value written by an earlier process is
/// visible to the next one. A missing file is an empty store. Writes replace
/// a file that no longer parses instead of failing on it.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to start a write from, and whether the document on disk was
    /// unparseable and got discarded.
    fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.load() {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Serialization(e)) => {
                warn!("replacing unreadable store {}: {}", self.path.display(), e);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        debug!("wrote {} key(s) to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let (mut entries, _) = self.load_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let (mut entries, replaced) = self.load_for_write()?;
        if entries.remove(key).is_some() || replaced {
            self.save(&entries)?;
        }
        Ok(())
    }
}
