//! Sharded on-disk [`StorageProvider`].
//!
//! Chunks land at `<root>/<cid[0..2]>/<cid[2..4]>/<cid>`, the same
//! two-level-prefix layout content-addressed stores have used since Git
//! popularized it — it keeps any one directory from holding millions of
//! entries. Writes go to a temp file in the target directory and are
//! renamed into place, so a reader never observes a partially written
//! chunk. Reads are served through an mmap so large chunks don't round-trip
//! through an extra heap buffer.
//!
//! All filesystem work runs on the blocking thread pool via
//! `spawn_blocking`, keeping the async trait's executor thread free while
//! std::fs does its thing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use dds_core::StorageError;
use memmap2::Mmap;

use crate::config::StorageConfig;
use crate::StorageProvider;

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    dir_levels: usize,
    prefix_len_per_level: usize,
}

impl FileStore {
    /// Open (creating if necessary) a file store rooted at `root`, using the
    /// default two-level/two-character shard geometry.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::with_config(StorageConfig { root: root.into(), ..StorageConfig::default() })
    }

    /// Open (creating if necessary) a file store with an explicit shard
    /// geometry.
    pub fn with_config(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.root).map_err(StorageError::Backend)?;
        Ok(Self {
            root: config.root,
            dir_levels: config.dir_levels,
            prefix_len_per_level: config.prefix_len_per_level,
        })
    }

    fn chunk_path(&self, cid: &str) -> Result<PathBuf, StorageError> {
        let min_len = self.dir_levels * self.prefix_len_per_level;
        if cid.len() < min_len {
            return Err(StorageError::InvalidCidFormat);
        }
        let mut path = self.root.clone();
        for level in 0..self.dir_levels {
            let start = level * self.prefix_len_per_level;
            let end = start + self.prefix_len_per_level;
            path = path.join(&cid[start..end]);
        }
        Ok(path.join(cid))
    }
}

#[async_trait]
impl StorageProvider for FileStore {
    async fn store(&self, cid: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.chunk_path(cid)?;
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(|e| StorageError::Backend(std::io::Error::other(e)))?
    }

    async fn retrieve(&self, cid: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.chunk_path(cid)?;
        tokio::task::spawn_blocking(move || read_via_mmap(&path))
            .await
            .map_err(|e| StorageError::Backend(std::io::Error::other(e)))?
            .map(|b| b.to_vec())
    }

    async fn has(&self, cid: &str) -> Result<bool, StorageError> {
        let path = self.chunk_path(cid)?;
        Ok(path.exists())
    }

    async fn delete(&self, cid: &str) -> Result<(), StorageError> {
        let path = self.chunk_path(cid)?;
        tokio::task::spawn_blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Backend(e)),
        })
        .await
        .map_err(|e| StorageError::Backend(std::io::Error::other(e)))?
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if path.exists() {
        // Content-addressed: an existing file under this CID already holds
        // the right bytes.
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StorageError::Backend)?;
    }

    let tmp_path = path.with_extension(format!("tmp-{}", std::process::id()));
    {
        let mut file = fs::File::create(&tmp_path).map_err(StorageError::Backend)?;
        file.write_all(data).map_err(StorageError::Backend)?;
        file.sync_all().map_err(StorageError::Backend)?;
    }
    fs::rename(&tmp_path, path).map_err(StorageError::Backend)?;
    tracing::trace!(path = %path.display(), "chunk written");
    Ok(())
}

fn read_via_mmap(path: &Path) -> Result<Bytes, StorageError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::ChunkNotFound)
        }
        Err(e) => return Err(StorageError::Backend(e)),
    };

    let meta = file.metadata().map_err(StorageError::Backend)?;
    if meta.len() == 0 {
        return Ok(Bytes::new());
    }

    // Safety: chunks are written once via write_atomic and never modified
    // in place, so the mapping won't observe concurrent mutation.
    let mmap = unsafe { Mmap::map(&file).map_err(StorageError::Backend)? };
    Ok(Bytes::copy_from_slice(&mmap))
}
