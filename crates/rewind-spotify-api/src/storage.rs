use std::collections::BTreeMap;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use eyre::Result;
use eyre::WrapErr;
use tokio::sync::Mutex;
use tracing::debug;

/// Key-value store that outlives the redirect to the authorize endpoint.
///
/// `get` leaves the value in place. `take` reads and deletes in one step, so a stored value
/// can be consumed only once.
pub trait SessionStorage: Send + Sync {
    fn put(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
    fn take(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// JSON object on disk, one entry per key.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .wrap_err_with(|| format!("Corrupt storage file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).wrap_err_with(|| format!("Failed to read {}", self.path.display())),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        tokio::fs::write(&self.path, serde_json::to_string_pretty(entries)?)
            .await
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))
    }
}

impl SessionStorage for FileStorage {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let value = entries.remove(key);
        if value.is_some() {
            self.save(&entries).await?;
            debug!("Took {} from {}", key, self.path.display());
        }
        Ok(value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl SessionStorage for MemoryStorage {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.remove(key))
    }
}
