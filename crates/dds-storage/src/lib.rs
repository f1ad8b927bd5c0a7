//! Pluggable chunk storage.
//!
//! [`StorageProvider`] is the seam the core service stores and retrieves
//! chunk bytes through. Two concrete implementations ship here: an
//! in-memory [`memory::MemoryStore`] for tests and small deployments, and a
//! sharded [`file::FileStore`] for on-disk persistence.

pub mod config;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use dds_core::StorageError;

pub use config::StorageConfig;
pub use file::FileStore;
pub use memory::MemoryStore;

/// A content-addressed store for chunk bytes.
///
/// Implementations own no knowledge of manifests or chunking — they store
/// and retrieve opaque bytes keyed by the CID the caller already computed.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Store `data` under `cid`. Storing the same CID twice is a no-op: the
    /// store is content-addressed, so the existing bytes are already
    /// correct (I7).
    async fn store(&self, cid: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve the bytes stored under `cid`, or
    /// [`StorageError::ChunkNotFound`] if absent.
    async fn retrieve(&self, cid: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether `cid` is present without paying for a full read.
    async fn has(&self, cid: &str) -> Result<bool, StorageError>;

    /// Remove `cid` if present. Removing an absent CID is not an error.
    async fn delete(&self, cid: &str) -> Result<(), StorageError>;
}
