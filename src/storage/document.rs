//! Document store abstraction.
//!
//! Accounts live in a NoSQL-style store addressed by `(collection, id)`.
//! Documents are plain JSON; typed access goes through the repositories in
//! `crate::account`, which validate the schema on the way in and out.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::error::AppResult;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Value>>;

    /// Creates or replaces the document.
    async fn set(&self, collection: &str, id: &str, document: Value) -> AppResult<()>;
}

/// In-process store for tests and demo launches.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .await
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(collection.to_string(), id.to_string())).cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        documents.insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }
}
