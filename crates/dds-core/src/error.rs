//! Error types shared across the DDS crates.
//!
//! Every variant that wraps a lower layer carries its cause via `#[source]`
//! so callers can walk the chain with `std::error::Error::source()` instead
//! of string-matching. The service-layer envelopes ([`DdsError::Publish`],
//! [`DdsError::Retrieve`]) are what a caller of [`dds_service`] actually
//! sees; everything else is an inner cause.

use thiserror::Error;

/// Errors raised by the chunker (`dds-core`'s `chunk` module).
#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("content size cannot be negative")]
    InvalidContentSize,

    #[error("number of bytes read from reader inconsistent with contentSize")]
    ReadInconsistentSize,

    #[error("chunk {0} has empty CID")]
    EmptyChunkCid(usize),

    #[error("originalContentSHA256 must be 32 bytes, got {0}")]
    InvalidHashLength(usize),

    #[error("I/O error while reading content")]
    Io(#[source] std::io::Error),
}

/// Errors raised by a [`StorageProvider`](dds-core's storage trait lives in
/// `dds-storage`; this error type is shared so both the storage crate and
/// the service crate speak the same vocabulary).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("chunk not found")]
    ChunkNotFound,

    #[error("invalid CID format")]
    InvalidCidFormat,

    #[error("storage is full")]
    StorageFull,

    #[error("storage backend error")]
    Backend(#[source] std::io::Error),
}

/// Errors raised by a `DiscoveryProvider`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery: operation timed out")]
    Timeout,

    #[error("discovery: operation failed")]
    Failed(#[source] Option<Box<dyn std::error::Error + Send + Sync>>),
}

/// Errors raised by a `NetworkProvider`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network: chunk not available from the specified peer")]
    ChunkNotAvailableFromPeer,

    #[error("network: target peer is unreachable")]
    PeerUnreachable,

    #[error("network: operation timed out")]
    Timeout,

    #[error("network: unspecified failure")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Service-layer envelope errors returned by `dds-service`'s core service.
///
/// These are the only errors a caller of `publish`/`retrieve` needs to match
/// on directly; the cause chain (inspectable via `source()`) carries the
/// specific inner failure.
#[derive(Debug, Error)]
pub enum DdsError {
    #[error("dds: publish operation failed: {context}")]
    Publish {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dds: retrieve operation failed: {context}")]
    Retrieve {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dds: invalid manifest CID: {0}")]
    InvalidManifestCid(String),

    #[error("dds: failed to fetch chunk {cid} from network")]
    ChunkFetchFailed {
        cid: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dds: operation cancelled")]
    Cancelled,
}

impl DdsError {
    pub fn publish(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DdsError::Publish { context: context.into(), source: Box::new(source) }
    }

    pub fn retrieve(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DdsError::Retrieve { context: context.into(), source: Box::new(source) }
    }

    /// Walk the error's cause chain looking for a source of type `T`.
    ///
    /// Mirrors `errors.Is`/`errors.As` chain inspection: callers use this to
    /// ask "is this failure a `StorageError::ChunkNotFound` anywhere in the
    /// chain?" without formatting and string-matching.
    pub fn chain_contains<T: std::error::Error + 'static>(&self) -> bool {
        let mut cause: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(self);
        while let Some(err) = cause {
            if err.downcast_ref::<T>().is_some() {
                return true;
            }
            cause = err.source();
        }
        false
    }
}
