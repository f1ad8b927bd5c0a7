//! P3 (chunk integrity), P4 (corruption detected), P5 (size enforcement),
//! P6 (whole-hash enforcement), and the spec's tamper scenario.

use std::io::Cursor;

use dds_core::{compute_cid, DdsError};
use dds_service::PublishOptions;

use crate::infra::{local_only_service, no_cancel};

#[tokio::test]
async fn every_stored_chunk_satisfies_cid_equals_hash_of_data() {
    let (service, store) = local_only_service();
    let data = vec![3u8; dds_core::DEFAULT_CHUNK_SIZE * 2 + 500];

    let manifest_cid = service
        .publish(Cursor::new(data.clone()), data.len() as u64, PublishOptions::default(), no_cancel())
        .await
        .unwrap();

    let serialized = store.retrieve(&manifest_cid).await.unwrap();
    let manifest = dds_core::decode_manifest(&serialized).unwrap();
    for chunk_cid in &manifest.chunk_cids {
        let bytes = store.retrieve(chunk_cid).await.unwrap();
        assert_eq!(&compute_cid(&bytes), chunk_cid);
    }
}

#[tokio::test]
async fn corrupting_a_stored_chunk_is_caught_on_retrieve() {
    let (service, store) = local_only_service();
    let data = b"original good data".to_vec();

    let manifest_cid = service
        .publish(Cursor::new(data.clone()), data.len() as u64, PublishOptions::default(), no_cancel())
        .await
        .unwrap();

    let serialized = store.retrieve(&manifest_cid).await.unwrap();
    let manifest = dds_core::decode_manifest(&serialized).unwrap();
    let first_chunk_cid = manifest.chunk_cids[0].clone();

    // MemoryStore::store is a content-addressed no-op on an existing key, so
    // go through delete+store to actually corrupt what's there.
    store.delete(&first_chunk_cid).await.unwrap();
    store.store(&first_chunk_cid, b"corrupted data here").await.unwrap();

    let err = service.retrieve(&manifest_cid, no_cancel()).await.unwrap_err();
    assert!(matches!(err, DdsError::Retrieve { .. }));
    assert!(
        err.to_string().contains(&first_chunk_cid),
        "error should name the corrupted chunk's CID: {err}"
    );
}

#[tokio::test]
async fn altered_size_field_is_rejected() {
    let (service, store) = local_only_service();
    let data = b"some content of known length".to_vec();

    let manifest_cid = service
        .publish(Cursor::new(data.clone()), data.len() as u64, PublishOptions::default(), no_cancel())
        .await
        .unwrap();

    let serialized = store.retrieve(&manifest_cid).await.unwrap();
    let mut manifest = dds_core::decode_manifest(&serialized).unwrap();
    manifest.original_content_size_bytes += 1;

    let tampered = dds_core::encode_manifest(&manifest);
    let tampered_cid = compute_cid(&tampered);
    store.store(&tampered_cid, &tampered).await.unwrap();

    let err = service.retrieve(&tampered_cid, no_cancel()).await.unwrap_err();
    assert!(matches!(err, DdsError::Retrieve { .. }));
}

#[tokio::test]
async fn altered_whole_hash_is_rejected() {
    let (service, store) = local_only_service();
    let data = b"some content whose hash we will corrupt".to_vec();

    let manifest_cid = service
        .publish(Cursor::new(data.clone()), data.len() as u64, PublishOptions::default(), no_cancel())
        .await
        .unwrap();

    let serialized = store.retrieve(&manifest_cid).await.unwrap();
    let mut manifest = dds_core::decode_manifest(&serialized).unwrap();
    manifest.original_content_sha256[0] ^= 0xFF;

    let tampered = dds_core::encode_manifest(&manifest);
    let tampered_cid = compute_cid(&tampered);
    store.store(&tampered_cid, &tampered).await.unwrap();

    let err = service.retrieve(&tampered_cid, no_cancel()).await.unwrap_err();
    assert!(matches!(err, DdsError::Retrieve { .. }));
}
