//! In-memory [`StorageProvider`], keyed directly by CID string.
//!
//! Bytes are copied on the way in and out so a caller can't mutate a chunk
//! after it's been stored by holding onto the slice they passed.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dds_core::StorageError;

use crate::StorageProvider;

#[derive(Clone, Default)]
pub struct MemoryStore {
    chunks: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { chunks: Arc::new(DashMap::new()) }
    }

    /// Number of distinct CIDs currently stored.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Snapshot of every stored (CID, bytes) pair. Intended for tests and
    /// debugging, not the hot path.
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        self.chunks.iter().map(|e| (e.key().clone(), e.value().clone())).collect()
    }

    pub fn clear(&self) {
        self.chunks.clear();
    }
}

#[async_trait]
impl StorageProvider for MemoryStore {
    async fn store(&self, cid: &str, data: &[u8]) -> Result<(), StorageError> {
        if cid.is_empty() {
            return Err(StorageError::InvalidCidFormat);
        }
        self.chunks.entry(cid.to_string()).or_insert_with(|| data.to_vec());
        Ok(())
    }

    async fn retrieve(&self, cid: &str) -> Result<Vec<u8>, StorageError> {
        if cid.is_empty() {
            return Err(StorageError::InvalidCidFormat);
        }
        self.chunks
            .get(cid)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::ChunkNotFound)
    }

    async fn has(&self, cid: &str) -> Result<bool, StorageError> {
        if cid.is_empty() {
            return Err(StorageError::InvalidCidFormat);
        }
        Ok(self.chunks.contains_key(cid))
    }

    async fn delete(&self, cid: &str) -> Result<(), StorageError> {
        if cid.is_empty() {
            return Err(StorageError::InvalidCidFormat);
        }
        self.chunks.remove(cid);
        Ok(())
    }
}
