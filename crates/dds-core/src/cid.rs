//! Content identifiers — the addressing scheme for the whole store.
//!
//! A CID is the base58-btc encoding of the SHA-256 digest of a byte slice.
//! No multihash framing, no multibase prefix, no version byte: the digest
//! is the entire payload. This pins manifest CIDs to a single, stable
//! encoding for the lifetime of the store.

use sha2::{Digest, Sha256};

/// Compute the content identifier for a byte slice.
///
/// Total, deterministic, and side-effect free. An empty slice is valid
/// input and produces `CID(&[])`, the identifier for empty content.
pub fn cid(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    bs58::encode(digest).into_string()
}

/// The CID of the empty byte string, computed once per process.
///
/// Every manifest describing zero-length content carries exactly this
/// value as its sole chunk CID (see [`crate::manifest`]).
pub fn empty_cid() -> String {
    cid(&[])
}
