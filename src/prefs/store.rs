//! Preference store backends

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Key-value store for persisted preferences
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// Volatile store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// JSON file store.
///
/// Reads are served from memory. Every change queues a snapshot to a writer
/// task, so callers never wait on the file system. The writer drains what
/// is queued and exits once the store is dropped; await the handle returned
/// by [`FileStore::open`] to know the file is current.
pub struct FileStore {
    values: BTreeMap<String, Value>,
    writer: mpsc::UnboundedSender<BTreeMap<String, Value>>,
}

impl FileStore {
    /// Load preferences from `path` and start the writer task.
    ///
    /// An unreadable file is moved aside and the store starts empty.
    /// Must be called from within a tokio runtime.
    pub fn open(path: impl Into<PathBuf>) -> (Self, JoinHandle<()>) {
        let path = path.into();
        let values = match Self::load(&path) {
            Ok(values) => {
                info!("Loaded {} preferences from {:?}", values.len(), path);
                values
            }
            Err(e) => {
                warn!("Ignoring unreadable preferences {:?}: {}", path, e);
                let aside = path.with_extension("json.corrupt");
                if let Err(e) = std::fs::rename(&path, &aside) {
                    warn!("Failed to move {:?} aside: {}", path, e);
                }
                BTreeMap::new()
            }
        };

        let (writer, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::write_loop(path, rx));

        (Self { values, writer }, task)
    }

    /// Read the preference file, empty if it does not exist yet
    pub fn load(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let values = serde_json::from_str(&contents)?;
        Ok(values)
    }

    async fn write_loop(path: PathBuf, mut rx: mpsc::UnboundedReceiver<BTreeMap<String, Value>>) {
        while let Some(mut snapshot) = rx.recv().await {
            // Only the newest snapshot matters
            while let Ok(newer) = rx.try_recv() {
                snapshot = newer;
            }

            if let Err(e) = Self::save(&path, &snapshot).await {
                warn!("Failed to save preferences to {:?}: {}", path, e);
            } else {
                debug!("Saved {} preferences", snapshot.len());
            }
        }
    }

    /// Write a preference snapshot as pretty JSON.
    ///
    /// The file is replaced by rename, so readers see the old or the new
    /// contents and never a partial write.
    pub async fn save(path: &Path, values: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(values)?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }

    fn persist(&self) {
        if self.writer.send(self.values.clone()).is_err() {
            warn!("Preference writer has stopped, change not saved");
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.persist();
        }
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
