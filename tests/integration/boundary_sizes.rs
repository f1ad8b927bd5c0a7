//! P8 (boundary sizes): every size at and around the chunk boundary
//! round-trips byte-for-byte.

use std::io::Cursor;

use dds_core::DEFAULT_CHUNK_SIZE;
use dds_service::PublishOptions;

use crate::infra::{local_only_service, no_cancel};

fn pseudo_random_bytes(len: usize, seed: u8) -> Vec<u8> {
    // Deterministic, non-uniform filler so we're not just round-tripping a
    // run of identical bytes.
    (0..len).map(|i| seed.wrapping_add((i % 251) as u8)).collect()
}

#[tokio::test]
async fn boundary_sizes_round_trip_exactly() {
    let sizes = [
        0usize,
        1,
        DEFAULT_CHUNK_SIZE - 1,
        DEFAULT_CHUNK_SIZE,
        DEFAULT_CHUNK_SIZE + 1,
        2 * DEFAULT_CHUNK_SIZE,
        2 * DEFAULT_CHUNK_SIZE + 10,
    ];

    for (i, &size) in sizes.iter().enumerate() {
        let (service, _store) = local_only_service();
        let data = pseudo_random_bytes(size, i as u8);

        let manifest_cid = service
            .publish(Cursor::new(data.clone()), size as u64, PublishOptions::default(), no_cancel())
            .await
            .unwrap_or_else(|e| panic!("publish failed for size {size}: {e}"));

        let (retrieved, reported_size) = service
            .retrieve(&manifest_cid, no_cancel())
            .await
            .unwrap_or_else(|e| panic!("retrieve failed for size {size}: {e}"));

        assert_eq!(reported_size, size as u64, "size {size}: reported size mismatch");
        assert_eq!(&retrieved[..], &data[..], "size {size}: content mismatch");
    }
}

#[tokio::test]
async fn chunk_count_matches_expected_shape_at_each_boundary() {
    let expectations = [
        (0usize, 1usize),
        (1, 1),
        (DEFAULT_CHUNK_SIZE, 1),
        (DEFAULT_CHUNK_SIZE + 1, 2),
        (2 * DEFAULT_CHUNK_SIZE, 2),
        (2 * DEFAULT_CHUNK_SIZE + 10, 3),
    ];

    for (size, expected_chunks) in expectations {
        let (service, store) = local_only_service();
        let data = pseudo_random_bytes(size, 7);

        let manifest_cid = service
            .publish(Cursor::new(data), size as u64, PublishOptions::default(), no_cancel())
            .await
            .unwrap();

        let serialized = store.retrieve(&manifest_cid).await.unwrap();
        let manifest = dds_core::decode_manifest(&serialized).unwrap();
        assert_eq!(
            manifest.chunk_cids.len(),
            expected_chunks,
            "size {size}: expected {expected_chunks} chunks"
        );
    }
}
