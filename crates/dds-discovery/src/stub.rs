//! An in-memory [`DiscoveryProvider`] for tests: pre-populate CID → peer
//! records and optionally configure errors, per-CID or as a default.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use dds_core::DiscoveryError;

use crate::{DiscoveryProvider, PeerId};

#[derive(Default)]
struct State {
    providers: HashMap<String, Vec<PeerId>>,
    find_peers_errors: HashMap<String, DiscoveryErrorKind>,
    provide_errors: HashMap<String, DiscoveryErrorKind>,
    default_find_peers_error: Option<DiscoveryErrorKind>,
    default_provide_error: Option<DiscoveryErrorKind>,
}

/// The small set of error shapes a test might want to simulate. Kept
/// separate from [`DiscoveryError`] because that type isn't `Clone` (its
/// `Failed` variant boxes a trait object) and the stub needs to hand the
/// same configured error out repeatedly.
#[derive(Debug, Clone, Copy)]
pub enum DiscoveryErrorKind {
    Timeout,
    Failed,
}

impl From<DiscoveryErrorKind> for DiscoveryError {
    fn from(kind: DiscoveryErrorKind) -> Self {
        match kind {
            DiscoveryErrorKind::Timeout => DiscoveryError::Timeout,
            DiscoveryErrorKind::Failed => DiscoveryError::Failed(None),
        }
    }
}

/// Stub implementation of [`DiscoveryProvider`] for exercising the core
/// service's DISCOVER step without a real DHT.
#[derive(Default)]
pub struct StubDiscoveryProvider {
    state: RwLock<State>,
}

impl StubDiscoveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a provider record for `cid`.
    pub fn add_provider_record(&self, cid: &str, peer: PeerId) {
        self.state.write().unwrap().providers.entry(cid.to_string()).or_default().push(peer);
    }

    pub fn set_find_peers_error(&self, cid: &str, kind: DiscoveryErrorKind) {
        self.state.write().unwrap().find_peers_errors.insert(cid.to_string(), kind);
    }

    pub fn set_provide_error(&self, cid: &str, kind: DiscoveryErrorKind) {
        self.state.write().unwrap().provide_errors.insert(cid.to_string(), kind);
    }

    pub fn set_default_find_peers_error(&self, kind: DiscoveryErrorKind) {
        self.state.write().unwrap().default_find_peers_error = Some(kind);
    }

    pub fn set_default_provide_error(&self, kind: DiscoveryErrorKind) {
        self.state.write().unwrap().default_provide_error = Some(kind);
    }

    pub fn clear_all(&self) {
        *self.state.write().unwrap() = State::default();
    }
}

#[async_trait]
impl DiscoveryProvider for StubDiscoveryProvider {
    async fn find_peers(&self, cid: &str, count: usize) -> Result<Vec<PeerId>, DiscoveryError> {
        let state = self.state.read().unwrap();

        if let Some(kind) = state.find_peers_errors.get(cid) {
            return Err((*kind).into());
        }
        if let Some(kind) = state.default_find_peers_error {
            return Err(kind.into());
        }

        let Some(peers) = state.providers.get(cid) else {
            return Ok(Vec::new());
        };

        if count > 0 && peers.len() > count {
            Ok(peers[..count].to_vec())
        } else {
            Ok(peers.clone())
        }
    }

    async fn provide(&self, cid: &str) -> Result<(), DiscoveryError> {
        let state = self.state.read().unwrap();
        if let Some(kind) = state.provide_errors.get(cid) {
            return Err((*kind).into());
        }
        if let Some(kind) = state.default_provide_error {
            return Err(kind.into());
        }
        Ok(())
    }
}
