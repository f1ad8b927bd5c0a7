//! Manifest construction, serialization, and parsing.
//!
//! The wire format is a tag-numbered, length-delimited encoding in the
//! style of protobuf's wire format, implemented by hand here rather than
//! pulled in from a full protobuf toolchain: the field set in §6 is closed
//! and stable, and a hand-rolled varint/length-delimited codec keeps the
//! dependency footprint proportional to what's actually encoded (seven
//! fields, no nesting beyond the metadata map).
//!
//! Unknown tags on decode are skipped, not rejected, so a manifest written
//! by a newer version of this format still decodes its known fields.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};

use crate::chunk::Chunk;
use crate::cid::cid;
use crate::error::ChunkingError;

const TAG_CHUNK_CIDS: u64 = 1;
const TAG_ORIGINAL_SHA256: u64 = 2;
const TAG_ORIGINAL_SIZE: u64 = 3;
const TAG_CREATION_TIMESTAMP: u64 = 4;
const TAG_MIME_TYPE: u64 = 5;
const TAG_FILENAME: u64 = 6;
const TAG_CUSTOM_METADATA: u64 = 7;

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

/// An immutable description of a logical object as an ordered list of chunk
/// CIDs plus whole-content integrity metadata.
///
/// Manifests are never mutated after construction; `generate_manifest` is
/// the only constructor and every field it accepts is validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub chunk_cids: Vec<String>,
    pub original_content_sha256: [u8; 32],
    pub original_content_size_bytes: u64,
    pub creation_timestamp: i64,
    pub mime_type: String,
    pub filename: String,
    pub custom_metadata: Option<BTreeMap<String, String>>,
}

/// Build a manifest from already-chunked, already-CID'd pieces and compute
/// its own CID.
///
/// Fails if `original_content_sha256` is not 32 bytes, or if any chunk
/// carries an empty CID (I6).
pub fn generate_manifest(
    chunks: &[Chunk],
    original_content_sha256: &[u8],
    original_content_size_bytes: u64,
    creation_time: SystemTime,
    mime_type: String,
    filename: String,
    custom_metadata: Option<BTreeMap<String, String>>,
) -> Result<(Manifest, String), ChunkingError> {
    if original_content_sha256.len() != 32 {
        return Err(ChunkingError::InvalidHashLength(original_content_sha256.len()));
    }

    let mut chunk_cids = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.cid.is_empty() {
            return Err(ChunkingError::EmptyChunkCid(i));
        }
        chunk_cids.push(chunk.cid.clone());
    }

    let mut hash = [0u8; 32];
    hash.copy_from_slice(original_content_sha256);

    let creation_timestamp = creation_time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_else(|e| -(e.duration().as_secs() as i64));

    let manifest = Manifest {
        chunk_cids,
        original_content_sha256: hash,
        original_content_size_bytes,
        creation_timestamp,
        mime_type,
        filename,
        custom_metadata,
    };

    let serialized = encode(&manifest);
    let manifest_cid = cid(&serialized);
    Ok((manifest, manifest_cid))
}

/// Serialize a manifest to its canonical wire bytes.
///
/// Encoding order is fixed (tags ascending, repeated fields in slice order)
/// so the same manifest value always produces the same bytes and therefore
/// the same CID.
pub fn encode(m: &Manifest) -> Bytes {
    let mut buf = BytesMut::new();

    for chunk_cid in &m.chunk_cids {
        write_tag(&mut buf, TAG_CHUNK_CIDS, WIRE_LEN);
        write_len_delimited(&mut buf, chunk_cid.as_bytes());
    }

    write_tag(&mut buf, TAG_ORIGINAL_SHA256, WIRE_LEN);
    write_len_delimited(&mut buf, &m.original_content_sha256);

    write_tag(&mut buf, TAG_ORIGINAL_SIZE, WIRE_VARINT);
    write_varint(&mut buf, m.original_content_size_bytes);

    write_tag(&mut buf, TAG_CREATION_TIMESTAMP, WIRE_VARINT);
    write_varint(&mut buf, zigzag_encode(m.creation_timestamp));

    if !m.mime_type.is_empty() {
        write_tag(&mut buf, TAG_MIME_TYPE, WIRE_LEN);
        write_len_delimited(&mut buf, m.mime_type.as_bytes());
    }

    if !m.filename.is_empty() {
        write_tag(&mut buf, TAG_FILENAME, WIRE_LEN);
        write_len_delimited(&mut buf, m.filename.as_bytes());
    }

    if let Some(meta) = &m.custom_metadata {
        for (k, v) in meta {
            let mut entry = BytesMut::new();
            write_tag(&mut entry, 1, WIRE_LEN);
            write_len_delimited(&mut entry, k.as_bytes());
            write_tag(&mut entry, 2, WIRE_LEN);
            write_len_delimited(&mut entry, v.as_bytes());

            write_tag(&mut buf, TAG_CUSTOM_METADATA, WIRE_LEN);
            write_len_delimited(&mut buf, &entry);
        }
    }

    buf.freeze()
}

/// Decode manifest wire bytes. Unknown tags are skipped.
pub fn decode(data: &[u8]) -> Result<Manifest, DecodeError> {
    let mut chunk_cids = Vec::new();
    let mut original_content_sha256 = [0u8; 32];
    let mut saw_hash = false;
    let mut original_content_size_bytes = 0u64;
    let mut creation_timestamp = 0i64;
    let mut mime_type = String::new();
    let mut filename = String::new();
    let mut custom_metadata: Option<BTreeMap<String, String>> = None;

    let mut pos = 0usize;
    while pos < data.len() {
        let (key, new_pos) = read_varint(data, pos)?;
        pos = new_pos;
        let tag = key >> 3;
        let wire_type = key & 0x7;

        match (tag, wire_type) {
            (TAG_CHUNK_CIDS, WIRE_LEN) => {
                let (bytes, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
                chunk_cids.push(String::from_utf8_lossy(bytes).into_owned());
            }
            (TAG_ORIGINAL_SHA256, WIRE_LEN) => {
                let (bytes, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
                if bytes.len() == 32 {
                    original_content_sha256.copy_from_slice(bytes);
                    saw_hash = true;
                }
            }
            (TAG_ORIGINAL_SIZE, WIRE_VARINT) => {
                let (v, new_pos) = read_varint(data, pos)?;
                pos = new_pos;
                original_content_size_bytes = v;
            }
            (TAG_CREATION_TIMESTAMP, WIRE_VARINT) => {
                let (v, new_pos) = read_varint(data, pos)?;
                pos = new_pos;
                creation_timestamp = zigzag_decode(v);
            }
            (TAG_MIME_TYPE, WIRE_LEN) => {
                let (bytes, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
                mime_type = String::from_utf8_lossy(bytes).into_owned();
            }
            (TAG_FILENAME, WIRE_LEN) => {
                let (bytes, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
                filename = String::from_utf8_lossy(bytes).into_owned();
            }
            (TAG_CUSTOM_METADATA, WIRE_LEN) => {
                let (entry, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
                let (k, v) = decode_metadata_entry(entry)?;
                custom_metadata.get_or_insert_with(BTreeMap::new).insert(k, v);
            }
            (_, WIRE_VARINT) => {
                let (_, new_pos) = read_varint(data, pos)?;
                pos = new_pos;
            }
            (_, WIRE_LEN) => {
                let (_, new_pos) = read_len_delimited(data, pos)?;
                pos = new_pos;
            }
            _ => return Err(DecodeError::UnknownWireType(wire_type)),
        }
    }

    let _ = saw_hash;

    Ok(Manifest {
        chunk_cids,
        original_content_sha256,
        original_content_size_bytes,
        creation_timestamp,
        mime_type,
        filename,
        custom_metadata,
    })
}

fn decode_metadata_entry(data: &[u8]) -> Result<(String, String), DecodeError> {
    let mut key = String::new();
    let mut value = String::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let (tag_key, new_pos) = read_varint(data, pos)?;
        pos = new_pos;
        let tag = tag_key >> 3;
        let (bytes, new_pos) = read_len_delimited(data, pos)?;
        pos = new_pos;
        match tag {
            1 => key = String::from_utf8_lossy(bytes).into_owned(),
            2 => value = String::from_utf8_lossy(bytes).into_owned(),
            _ => {}
        }
    }
    Ok((key, value))
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated manifest: expected more bytes at offset {0}")]
    Truncated(usize),
    #[error("varint too long at offset {0}")]
    VarintTooLong(usize),
    #[error("unknown wire type {0}")]
    UnknownWireType(u64),
}

fn write_tag(buf: &mut BytesMut, tag: u64, wire_type: u64) {
    write_varint(buf, (tag << 3) | wire_type);
}

fn write_varint(buf: &mut BytesMut, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.extend_from_slice(&[byte]);
        if value == 0 {
            break;
        }
    }
}

fn write_len_delimited(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

fn read_varint(data: &[u8], mut pos: usize) -> Result<(u64, usize), DecodeError> {
    let start = pos;
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        if pos >= data.len() {
            return Err(DecodeError::Truncated(start));
        }
        let byte = data[pos];
        pos += 1;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }
        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::VarintTooLong(start));
        }
    }
}

fn read_len_delimited(data: &[u8], pos: usize) -> Result<(&[u8], usize), DecodeError> {
    let (len, pos) = read_varint(data, pos)?;
    let len = len as usize;
    let end = pos.checked_add(len).ok_or(DecodeError::Truncated(pos))?;
    if end > data.len() {
        return Err(DecodeError::Truncated(pos));
    }
    Ok((&data[pos..end], end))
}

fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}
