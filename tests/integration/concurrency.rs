//! P11: N concurrent publishes followed by N concurrent retrieves, all
//! succeeding with content that corresponds to what each publish sent in.

use std::io::Cursor;

use dds_service::PublishOptions;

use crate::infra::{local_only_service, no_cancel};

#[tokio::test]
async fn concurrent_publishes_and_retrieves_round_trip_independently() {
    const N: usize = 32;
    let (service, _store) = local_only_service();

    let publish_handles: Vec<_> = (0..N)
        .map(|i| {
            let service = service.clone();
            let data = vec![i as u8; dds_core::DEFAULT_CHUNK_SIZE / 4 + i];
            tokio::spawn(async move {
                let manifest_cid = service
                    .publish(Cursor::new(data.clone()), data.len() as u64, PublishOptions::default(), no_cancel())
                    .await
                    .unwrap();
                (manifest_cid, data)
            })
        })
        .collect();

    let mut published = Vec::with_capacity(N);
    for handle in publish_handles {
        published.push(handle.await.unwrap());
    }

    let retrieve_handles: Vec<_> = published
        .into_iter()
        .map(|(manifest_cid, expected)| {
            let service = service.clone();
            tokio::spawn(async move {
                let (retrieved, size) = service.retrieve(&manifest_cid, no_cancel()).await.unwrap();
                assert_eq!(&retrieved[..], &expected[..]);
                assert_eq!(size, expected.len() as u64);
            })
        })
        .collect();

    for handle in retrieve_handles {
        handle.await.unwrap();
    }
}
