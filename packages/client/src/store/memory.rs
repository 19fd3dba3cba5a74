//! In-memory store. Contents are lost when the process exits.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{LocalStore, StoreError};

/// Thread-safe in-memory implementation of [`LocalStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.write().unwrap().remove(key);
        Ok(())
    }
}
