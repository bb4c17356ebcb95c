use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{EmbeddingError, EmbeddingResult};

/// Store gateway for embeddings records.
///
/// One instance is shared by all concurrent requests. Every call is a single
/// attempt; retrying is left to the event producer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the keyspace and table if missing. Safe to repeat.
    async fn ensure_schema(&self) -> EmbeddingResult<()>;

    /// Insert or overwrite the record keyed by `id`.
    async fn put(&self, id: &str, embeddings: &str) -> EmbeddingResult<()>;

    /// Fetch the payload for `id`, or `NotFound`.
    async fn get(&self, id: &str) -> EmbeddingResult<String>;

    /// Cheapest round trip to the backend
    async fn health_check(&self) -> EmbeddingResult<()>;
}

/// In-memory implementation of RecordStore (for development/testing)
///
/// Like the real store, reads and writes fail until the schema exists.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<String, String>>>,
    provisioned: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose schema already exists.
    pub fn provisioned() -> Self {
        let store = Self::default();
        store.provisioned.store(true, Ordering::SeqCst);
        store
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn require_schema(&self) -> EmbeddingResult<()> {
        if self.provisioned.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EmbeddingError::Store("table does not exist".to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn ensure_schema(&self) -> EmbeddingResult<()> {
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn put(&self, id: &str, embeddings: &str) -> EmbeddingResult<()> {
        self.require_schema()?;
        self.records
            .write()
            .await
            .insert(id.to_string(), embeddings.to_string());
        Ok(())
    }

    async fn get(&self, id: &str) -> EmbeddingResult<String> {
        self.require_schema()?;
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EmbeddingError::NotFound(id.to_string()))
    }

    async fn health_check(&self) -> EmbeddingResult<()> {
        Ok(())
    }
}
