//! Fetching chunk bytes from a specific remote peer.
//!
//! [`NetworkProvider`] is deliberately narrow: it does not choose which
//! peer to ask (that's [`dds_discovery::DiscoveryProvider`]'s job) or
//! verify what comes back (the core service checks the CID). It only
//! knows how to ask one named peer for one named chunk.

pub mod stub;

use async_trait::async_trait;
use dds_core::NetworkError;
use dds_discovery::PeerId;

pub use stub::StubNetworkProvider;

#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Fetch the bytes for `cid` from `target_peer`.
    async fn fetch_chunk(&self, cid: &str, target_peer: &PeerId) -> Result<Vec<u8>, NetworkError>;
}
