//! Peer discovery for content identified by CID.
//!
//! [`DiscoveryProvider`] is the seam the core service asks "who has this
//! chunk?" through. The production implementation would speak to a DHT;
//! [`StubDiscoveryProvider`] is an in-memory test double with the same
//! shape, used by `dds-service`'s own tests and by anything downstream
//! that wants to exercise the retrieve path without real networking.

pub mod stub;

use async_trait::async_trait;
use dds_core::DiscoveryError;
use serde::{Deserialize, Serialize};

pub use stub::StubDiscoveryProvider;

/// Opaque identifier for a remote peer. Production code would carry a
/// libp2p `PeerId`-equivalent here; this crate only needs something
/// hashable and comparable to route fetch attempts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub String);

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        PeerId(s.to_string())
    }
}

/// Finds and announces providers for content identified by CID.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Find up to `count` peers known to hold the chunk for `cid`.
    ///
    /// An empty vector with `Ok` means the search completed but found
    /// nothing; it is not an error (mirrors standard DHT client behavior).
    async fn find_peers(&self, cid: &str, count: usize) -> Result<Vec<PeerId>, DiscoveryError>;

    /// Announce that the local node can provide `cid`.
    async fn provide(&self, cid: &str) -> Result<(), DiscoveryError>;
}
