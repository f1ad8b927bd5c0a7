//! Chunking — dividing a bounded byte stream into fixed-size, content-addressed
//! chunks.
//!
//! The chunker never buffers more than one chunk's worth of data and never
//! reads more than the declared `content_size`, even if the underlying
//! stream has more to give.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::cid::cid;
use crate::error::ChunkingError;

/// Standard chunk size: 256 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// A leaf data unit: owned bytes plus the CID derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data: Bytes,
    pub cid: String,
}

impl Chunk {
    fn new(data: Bytes) -> Self {
        let cid = cid(&data);
        Self { data, cid }
    }
}

/// Read exactly `content_size` bytes from `content`, splitting them into
/// chunks of at most [`DEFAULT_CHUNK_SIZE`] bytes each.
///
/// `content_size == 0` produces a single empty chunk and does not touch the
/// reader. Fewer than `content_size` bytes available before EOF is reported
/// as [`ChunkingError::ReadInconsistentSize`]; bytes beyond `content_size`
/// are never read, let alone chunked.
pub async fn chunk_data<R>(
    mut content: R,
    content_size: u64,
) -> Result<Vec<Chunk>, ChunkingError>
where
    R: AsyncRead + Unpin,
{
    if content_size == 0 {
        return Ok(vec![Chunk::new(Bytes::new())]);
    }

    let mut chunks = Vec::new();
    let mut total_read: u64 = 0;

    while total_read < content_size {
        let remaining = content_size - total_read;
        let want = remaining.min(DEFAULT_CHUNK_SIZE as u64) as usize;
        let mut buf = vec![0u8; want];

        let mut filled = 0usize;
        while filled < want {
            let n = content
                .read(&mut buf[filled..])
                .await
                .map_err(ChunkingError::Io)?;
            if n == 0 {
                // EOF before we filled this slice: the stream ran dry short
                // of content_size.
                return Err(ChunkingError::ReadInconsistentSize);
            }
            filled += n;
        }

        total_read += filled as u64;
        let chunk = Chunk::new(Bytes::from(buf));
        tracing::trace!(cid = %chunk.cid, len = chunk.data.len(), "chunk produced");
        chunks.push(chunk);
    }

    tracing::debug!(content_size, chunks = chunks.len(), "chunking complete");
    Ok(chunks)
}
