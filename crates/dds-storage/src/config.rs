//! Configuration for the sharded on-disk [`crate::FileStore`].
//!
//! Resolution order mirrors the rest of this codebase's services:
//! explicit config struct (constructed by the caller) → `StorageConfig::load`
//! reads a TOML file if one is pointed to by `DDS_STORAGE_CONFIG`, else
//! falls back to [`StorageConfig::default`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Shard geometry and root path for [`crate::FileStore`].
///
/// A chunk with CID `abcdefgh…` is written to
/// `<root>/<cid[0..prefix_len_per_level]>/<cid[prefix_len_per_level..2*prefix_len_per_level]>/…/<cid>`,
/// one path segment per `dir_levels`. The default, `dir_levels = 2,
/// prefix_len_per_level = 2`, is the two-level/two-character layout
/// content-addressed stores have used since Git popularized it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub dir_levels: usize,
    pub prefix_len_per_level: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            dir_levels: 2,
            prefix_len_per_level: 2,
        }
    }
}

fn default_root() -> PathBuf {
    data_dir().join("chunks")
}

fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"))
        .join("dds")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

impl StorageConfig {
    /// `$DDS_STORAGE_CONFIG` if set and parseable, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let Ok(path) = std::env::var("DDS_STORAGE_CONFIG") else {
            return Ok(Self::default());
        };
        let path = PathBuf::from(path);
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path, e))
    }

    /// Minimum CID length this geometry requires to shard (`dir_levels *
    /// prefix_len_per_level`); shorter CIDs are rejected by [`crate::FileStore`].
    pub fn min_cid_len(&self) -> usize {
        self.dir_levels * self.prefix_len_per_level
    }
}
