//! Core types and algorithms for the distributed data store: content
//! identifiers, chunking, the streaming hasher, and the manifest codec.
//!
//! Nothing in this crate touches storage, discovery, or the network — see
//! `dds-storage`, `dds-discovery`, `dds-network`, and `dds-service` for the
//! collaborators that make use of these primitives.

pub mod chunk;
pub mod cid;
pub mod error;
pub mod hashing;
pub mod manifest;

pub use chunk::{chunk_data, Chunk, DEFAULT_CHUNK_SIZE};
pub use cid::{cid as compute_cid, empty_cid};
pub use error::{ChunkingError, DdsError, DiscoveryError, NetworkError, StorageError};
pub use hashing::HashingReader;
pub use manifest::{decode as decode_manifest, encode as encode_manifest, generate_manifest, DecodeError, Manifest};
