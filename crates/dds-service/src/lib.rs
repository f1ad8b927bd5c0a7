//! The core orchestration service: publish content into the store, and
//! retrieve it back out again.
//!
//! [`DdsCoreService`] is the one thing application code talks to. It owns
//! no state of its own beyond its three collaborators — storage, network,
//! discovery — and is safe to share behind an `Arc` across tasks.

mod options;
mod retrieve;

pub use options::PublishOptions;

use std::sync::Arc;

use bytes::Bytes;
use dds_core::{
    chunk_data, compute_cid, decode_manifest, encode_manifest, generate_manifest, ChunkingError,
    DdsError, HashingReader,
};
use dds_discovery::DiscoveryProvider;
use dds_network::NetworkProvider;
use dds_storage::StorageProvider;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use retrieve::{retrieve_chunk_data, ChunkFetchError};

/// Orchestrates publish/retrieve over pluggable storage, discovery, and
/// network collaborators.
///
/// Cloning is cheap: every field is an `Arc`.
#[derive(Clone)]
pub struct DdsCoreService {
    store: Arc<dyn StorageProvider>,
    network: Arc<dyn NetworkProvider>,
    discovery: Arc<dyn DiscoveryProvider>,
}

impl DdsCoreService {
    pub fn new(
        store: Arc<dyn StorageProvider>,
        network: Arc<dyn NetworkProvider>,
        discovery: Arc<dyn DiscoveryProvider>,
    ) -> Self {
        Self { store, network, discovery }
    }

    /// Chunk `content`, store every chunk and the manifest describing them,
    /// and return the manifest's CID.
    ///
    /// `content_size` must match exactly how many bytes `content` yields;
    /// a mismatch surfaces as [`DdsError::Publish`] wrapping a
    /// [`ChunkingError::ReadInconsistentSize`].
    pub async fn publish<R>(
        &self,
        content: R,
        content_size: u64,
        options: PublishOptions,
        cancel: CancellationToken,
    ) -> Result<String, DdsError>
    where
        R: AsyncRead + Unpin,
    {
        if cancel.is_cancelled() {
            return Err(DdsError::Cancelled);
        }

        let mut hashing = HashingReader::new(content);

        let chunks = chunk_data(&mut hashing, content_size)
            .await
            .map_err(|e| DdsError::publish("chunking content", e))?;

        let actual_size = hashing.bytes_read();
        let original_hash = hashing.sum();

        for chunk in &chunks {
            if cancel.is_cancelled() {
                return Err(DdsError::Cancelled);
            }
            self.store
                .store(&chunk.cid, &chunk.data)
                .await
                .map_err(|e| DdsError::publish(format!("storing chunk {}", chunk.cid), e))?;
        }

        let (manifest, manifest_cid) = generate_manifest(
            &chunks,
            &original_hash,
            actual_size,
            std::time::SystemTime::now(),
            options.mime_type,
            options.filename,
            options.custom_metadata,
        )
        .map_err(|e| DdsError::publish("generating manifest", e))?;

        let serialized = encode_manifest(&manifest);
        self.store
            .store(&manifest_cid, &serialized)
            .await
            .map_err(|e| DdsError::publish(format!("storing manifest {manifest_cid}"), e))?;

        tracing::info!(manifest_cid = %manifest_cid, chunks = chunks.len(), "published content");
        Ok(manifest_cid)
    }

    /// Fetch and reassemble the content described by `manifest_cid`.
    ///
    /// Verifies every chunk's CID, the reassembled size, and the whole-
    /// content SHA-256 before returning — a caller never sees data that
    /// doesn't match its own manifest.
    pub async fn retrieve(
        &self,
        manifest_cid: &str,
        cancel: CancellationToken,
    ) -> Result<(Bytes, u64), DdsError> {
        if manifest_cid.is_empty() {
            return Err(DdsError::InvalidManifestCid("manifest CID cannot be empty".to_string()));
        }
        if cancel.is_cancelled() {
            return Err(DdsError::Cancelled);
        }

        let serialized = retrieve_chunk_data(
            &*self.store,
            &*self.discovery,
            &*self.network,
            manifest_cid,
            &cancel,
        )
        .await
        .map_err(|e| wrap_chunk_fetch_error(format!("fetching manifest {manifest_cid}"), manifest_cid, e))?;

        let manifest = decode_manifest(&serialized)
            .map_err(|e| DdsError::retrieve(format!("unmarshalling manifest {manifest_cid}"), e))?;

        if manifest.chunk_cids.is_empty() && manifest.original_content_size_bytes > 0 {
            return Err(DdsError::retrieve(
                format!("manifest {manifest_cid}"),
                ChunkingError::EmptyChunkCid(0),
            ));
        }

        let empty_cid = compute_cid(&[]);

        if !manifest.chunk_cids.is_empty()
            && manifest.original_content_size_bytes == 0
            && manifest.chunk_cids[0] != empty_cid
        {
            return Err(DdsError::retrieve(
                format!("manifest {manifest_cid} claims 0 size but chunk CID isn't the empty CID"),
                ChunkingError::InvalidContentSize,
            ));
        }

        let mut reassembled = Vec::with_capacity(manifest.original_content_size_bytes as usize);
        let mut total_read: u64 = 0;

        if manifest.original_content_size_bytes == 0 && manifest.chunk_cids.len() == 1 {
            let data = retrieve_chunk_data(
                &*self.store,
                &*self.discovery,
                &*self.network,
                &manifest.chunk_cids[0],
                &cancel,
            )
            .await
            .map_err(|e| {
                wrap_chunk_fetch_error(
                    format!("empty data chunk {} for manifest {manifest_cid}", manifest.chunk_cids[0]),
                    &manifest.chunk_cids[0],
                    e,
                )
            })?;
            if !data.is_empty() {
                return Err(DdsError::retrieve(
                    format!("empty data chunk {} was not empty", manifest.chunk_cids[0]),
                    ChunkingError::InvalidContentSize,
                ));
            }
        } else {
            for (i, chunk_cid) in manifest.chunk_cids.iter().enumerate() {
                if cancel.is_cancelled() {
                    return Err(DdsError::Cancelled);
                }
                let data = retrieve_chunk_data(
                    &*self.store,
                    &*self.discovery,
                    &*self.network,
                    chunk_cid,
                    &cancel,
                )
                .await
                .map_err(|e| {
                    wrap_chunk_fetch_error(
                        format!("data chunk {chunk_cid} (index {i}) for manifest {manifest_cid}"),
                        chunk_cid,
                        e,
                    )
                })?;

                let calculated = compute_cid(&data);
                if &calculated != chunk_cid {
                    return Err(DdsError::retrieve(
                        format!(
                            "integrity check failed for chunk {chunk_cid} (index {i}): got {calculated}"
                        ),
                        ChunkingError::EmptyChunkCid(i),
                    ));
                }

                total_read += data.len() as u64;
                reassembled.extend_from_slice(&data);
            }
        }

        let total_read = if manifest.original_content_size_bytes == 0 && manifest.chunk_cids.len() == 1
        {
            0
        } else {
            total_read
        };

        if total_read != manifest.original_content_size_bytes {
            return Err(DdsError::retrieve(
                format!(
                    "reassembled size {total_read} does not match manifest size {} for {manifest_cid}",
                    manifest.original_content_size_bytes
                ),
                ChunkingError::ReadInconsistentSize,
            ));
        }

        let final_hash: [u8; 32] = {
            use sha2::{Digest, Sha256};
            Sha256::digest(&reassembled).into()
        };
        if final_hash != manifest.original_content_sha256 {
            return Err(DdsError::retrieve(
                format!("reassembled content hash mismatch for manifest {manifest_cid}"),
                ChunkingError::ReadInconsistentSize,
            ));
        }

        Ok((Bytes::from(reassembled), manifest.original_content_size_bytes))
    }
}

/// Turn a failed chunk fetch into the outer `Retrieve` envelope the spec
/// requires every retrieve failure to surface, with a `ChunkFetchFailed`
/// link in between so callers can still distinguish "the network gave up"
/// from other causes by walking the chain.
///
/// Cancellation is the one exception: it propagates as a bare
/// [`DdsError::Cancelled`], not wrapped in either envelope.
fn wrap_chunk_fetch_error(context: impl Into<String>, cid: &str, err: ChunkFetchError) -> DdsError {
    if matches!(err, ChunkFetchError::Cancelled) {
        return DdsError::Cancelled;
    }
    let fetch_failed = DdsError::ChunkFetchFailed { cid: cid.to_string(), source: Box::new(err) };
    DdsError::retrieve(context, fetch_failed)
}
