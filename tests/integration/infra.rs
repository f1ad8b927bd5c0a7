//! Shared harness for wiring a [`dds_service::DdsCoreService`] up from real
//! and stub collaborators.

use std::sync::Arc;

use dds_discovery::StubDiscoveryProvider;
use dds_network::StubNetworkProvider;
use dds_service::DdsCoreService;
use dds_storage::MemoryStore;
use tokio_util::sync::CancellationToken;

/// A service backed entirely by in-memory stores and stub network/discovery
/// with nothing registered in them — retrieval misses never find peers.
pub fn local_only_service() -> (DdsCoreService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let network = Arc::new(StubNetworkProvider::new());
    let discovery = Arc::new(StubDiscoveryProvider::new());
    (DdsCoreService::new(store.clone(), network, discovery), store)
}

/// Everything needed to drive a two-node cache-aside scenario: a "local"
/// service with an empty store and a "remote" service that actually holds
/// the data, sharing a stub network/discovery fabric a test can puppet
/// directly.
pub struct NetworkedPair {
    pub local: DdsCoreService,
    pub local_store: Arc<MemoryStore>,
    pub remote: DdsCoreService,
    pub remote_store: Arc<MemoryStore>,
    pub network: Arc<StubNetworkProvider>,
    pub discovery: Arc<StubDiscoveryProvider>,
}

/// Two services — "local" and "remote" — sharing a stub network/discovery
/// fabric but each with its own local store, so publishing against one and
/// retrieving through the other exercises the cache-aside network fallback.
pub fn networked_pair() -> NetworkedPair {
    let network = Arc::new(StubNetworkProvider::new());
    let discovery = Arc::new(StubDiscoveryProvider::new());

    let local_store = Arc::new(MemoryStore::new());
    let local = DdsCoreService::new(local_store.clone(), network.clone(), discovery.clone());

    let remote_store = Arc::new(MemoryStore::new());
    let remote = DdsCoreService::new(remote_store.clone(), network.clone(), discovery.clone());

    NetworkedPair { local, local_store, remote, remote_store, network, discovery }
}

/// Make everything currently in `remote_store` fetchable over the stub
/// network, and discoverable (each chunk, including the manifest) as served
/// by `peer`.
pub fn publish_remote_availability(pair: &NetworkedPair, peer: dds_discovery::PeerId) {
    for (chunk_cid, data) in pair.remote_store.entries() {
        pair.network.add_chunk(&chunk_cid, data);
        pair.discovery.add_provider_record(&chunk_cid, peer.clone());
    }
}

pub fn no_cancel() -> CancellationToken {
    CancellationToken::new()
}
