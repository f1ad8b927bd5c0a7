//! An in-memory [`NetworkProvider`] for tests.
//!
//! Responses can be registered three ways, checked in order: a
//! peer-and-CID-specific closure, a generally available chunk (any peer
//! can "serve" it), then a configured default error.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use dds_core::NetworkError;
use dds_discovery::PeerId;

use crate::NetworkProvider;

type ResponseFn = Arc<dyn Fn() -> Result<Vec<u8>, NetworkError> + Send + Sync>;

#[derive(Default)]
struct State {
    chunks: HashMap<String, Vec<u8>>,
    peer_responses: HashMap<(PeerId, String), ResponseFn>,
    default_error: Option<Arc<dyn Fn() -> NetworkError + Send + Sync>>,
}

#[derive(Default)]
pub struct StubNetworkProvider {
    state: RwLock<State>,
}

impl StubNetworkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `cid` servable, regardless of which peer is asked.
    pub fn add_chunk(&self, cid: &str, data: Vec<u8>) {
        self.state.write().unwrap().chunks.insert(cid.to_string(), data);
    }

    /// Configure an exact response for one (peer, cid) pair.
    pub fn set_peer_response<F>(&self, target_peer: PeerId, cid: &str, response_fn: F)
    where
        F: Fn() -> Result<Vec<u8>, NetworkError> + Send + Sync + 'static,
    {
        self.state
            .write()
            .unwrap()
            .peer_responses
            .insert((target_peer, cid.to_string()), Arc::new(response_fn));
    }

    /// Configure the error returned when nothing else matches.
    pub fn set_default_error<F>(&self, make_err: F)
    where
        F: Fn() -> NetworkError + Send + Sync + 'static,
    {
        self.state.write().unwrap().default_error = Some(Arc::new(make_err));
    }

    pub fn clear_responses(&self) {
        let mut state = self.state.write().unwrap();
        state.peer_responses.clear();
        state.default_error = None;
    }

    pub fn clear_chunks(&self) {
        self.state.write().unwrap().chunks.clear();
    }

    pub fn clear_all(&self) {
        *self.state.write().unwrap() = State::default();
    }
}

#[async_trait]
impl NetworkProvider for StubNetworkProvider {
    async fn fetch_chunk(&self, cid: &str, target_peer: &PeerId) -> Result<Vec<u8>, NetworkError> {
        let state = self.state.read().unwrap();

        let key = (target_peer.clone(), cid.to_string());
        if let Some(response_fn) = state.peer_responses.get(&key) {
            return response_fn();
        }

        if let Some(data) = state.chunks.get(cid) {
            return Ok(data.clone());
        }

        if let Some(make_err) = &state.default_error {
            return Err(make_err());
        }

        Err(NetworkError::ChunkNotAvailableFromPeer)
    }
}
