//! A tee-while-you-read adapter: hashes every byte a consumer pulls through
//! it without buffering the stream twice.
//!
//! The chunker reads through a [`HashingReader`] so that by the time it has
//! consumed `contentSize` bytes, the wrapped hasher already holds the
//! SHA-256 of exactly those bytes — no second pass over the data.

use std::pin::Pin;
use std::task::{Context, Poll};

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, ReadBuf};

/// Wraps an [`AsyncRead`], accumulating a running SHA-256 and a byte count
/// of everything read through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
}

impl<R: AsyncRead + Unpin> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, hasher: Sha256::new(), bytes_read: 0 }
    }

    /// SHA-256 of all bytes read so far.
    pub fn sum(&self) -> [u8; 32] {
        self.hasher.clone().finalize().into()
    }

    /// Total bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for HashingReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let result = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &result {
            let filled = buf.filled();
            let new_bytes = &filled[before..];
            if !new_bytes.is_empty() {
                self.hasher.update(new_bytes);
                self.bytes_read += new_bytes.len() as u64;
            }
        }
        result
    }
}
