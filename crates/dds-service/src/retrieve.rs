//! The cache-aside chunk fetch: local store first, then discover peers and
//! fetch from the network, caching a successful network fetch back into
//! local storage.

use dds_core::{DiscoveryError, NetworkError, StorageError};
use dds_discovery::DiscoveryProvider;
use dds_network::NetworkProvider;
use dds_storage::StorageProvider;
use tokio_util::sync::CancellationToken;

/// How many peers to ask discovery for when a chunk isn't local.
const MAX_PEERS_TO_TRY: usize = 5;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ChunkFetchError {
    #[error("local storage error")]
    Storage(#[source] StorageError),

    #[error("not found locally and no network peers were found")]
    NoPeersFound(#[source] StorageError),

    #[error("peer discovery failed")]
    Discovery(#[source] DiscoveryError),

    #[error("fetch from all tried peers failed")]
    AllPeersFailed(#[source] NetworkError),

    #[error("operation cancelled")]
    Cancelled,
}

/// LOCAL_LOOKUP → DISCOVER → FETCH, with a cache-aside write-back on a
/// successful network fetch.
///
/// A failure to write the fetched bytes back into local storage is logged
/// and otherwise ignored: the caller already has good data.
pub(crate) async fn retrieve_chunk_data(
    store: &dyn StorageProvider,
    discovery: &dyn DiscoveryProvider,
    network: &dyn NetworkProvider,
    cid: &str,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ChunkFetchError> {
    if cancel.is_cancelled() {
        return Err(ChunkFetchError::Cancelled);
    }

    // LOCAL_LOOKUP
    match store.retrieve(cid).await {
        Ok(data) => return Ok(data),
        Err(StorageError::ChunkNotFound) => {}
        Err(e) => return Err(ChunkFetchError::Storage(e)),
    }

    // DISCOVER
    let peers = discovery
        .find_peers(cid, MAX_PEERS_TO_TRY)
        .await
        .map_err(ChunkFetchError::Discovery)?;

    if peers.is_empty() {
        return Err(ChunkFetchError::NoPeersFound(StorageError::ChunkNotFound));
    }

    // FETCH: first success wins.
    let mut last_err = NetworkError::ChunkNotAvailableFromPeer;
    for peer in &peers {
        if cancel.is_cancelled() {
            return Err(ChunkFetchError::Cancelled);
        }
        match network.fetch_chunk(cid, peer).await {
            Ok(data) => {
                if let Err(e) = store.store(cid, &data).await {
                    tracing::warn!(cid, peer = %peer, error = %e, "failed to cache fetched chunk locally");
                }
                return Ok(data);
            }
            Err(e) => {
                tracing::debug!(cid, peer = %peer, error = %e, "peer did not serve chunk, trying next");
                last_err = e;
            }
        }
    }

    Err(ChunkFetchError::AllPeersFailed(last_err))
}
