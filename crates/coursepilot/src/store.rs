//! File-backed key-value store: a single JSON document under the state
//! directory, replaced atomically on every write so a crash never leaves
//! a half-written record.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;

use coursepilot_common::error::StoreError;
use coursepilot_common::store::KeyValueStore;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coursepilot")
            .join("state.json")
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StoreError::Backend(format!("corrupt state file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
