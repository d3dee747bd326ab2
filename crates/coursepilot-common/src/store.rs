//! Durable key-value storage seam.
//!
//! The engine's only persistent state is the queue record and the enabled
//! flag, both stored as strings through this trait. Implementations must
//! be durable across full page reloads and navigations within the same
//! browsing context; writes are whole-value replacement.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StoreError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and simulation runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}
