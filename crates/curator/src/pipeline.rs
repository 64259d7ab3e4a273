//! The encrypt-then-upload pipeline.
//!
//! Both stages are best-effort: a failing item is logged and dropped while
//! the survivors keep their input order. Callers must not assume the output
//! length equals the input length; the outcome reports how many items each
//! stage dropped.

use std::env;
use std::sync::OnceLock;

use base64::prelude::*;
use futures::stream::{self, StreamExt};
use serde_json::json;
use tracing::{debug, error, warn};

use seal::EncryptedObject;
use store::{PublishedBlobRecord, StorageWindow};
use walrus::{BlobAttestation, StoreBlobParams};

use crate::clients::{BlobStore, Encryptor};

/// Get the encrypt-stage fan-out limit from env var or default
fn get_max_concurrency() -> usize {
    static MAX_CONCURRENCY_CACHE: OnceLock<usize> = OnceLock::new();
    *MAX_CONCURRENCY_CACHE.get_or_init(|| {
        env::var("SEAL_MAX_CONCURRENCY")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()
            .unwrap_or(8)
            .max(1)
    })
}

/// Result of pushing an album's contents through both stages.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub records: Vec<PublishedBlobRecord>,
    pub dropped_encrypt: usize,
    pub dropped_upload: usize,
}

impl PublishOutcome {
    pub fn dropped(&self) -> usize {
        self.dropped_encrypt + self.dropped_upload
    }
}

/// Encrypt the album's raw contents (base64 strings), each under a freshly
/// derived identity. Runs with bounded fan-out; results come back in input
/// order with failed items dropped.
pub async fn encrypt_contents<E: Encryptor>(
    encryptor: &E,
    album_id: &str,
    raw_contents: &[String],
) -> (Vec<EncryptedObject>, usize) {
    let limit = get_max_concurrency();
    debug!(
        "Encrypting {} items for album {} (fan-out {})",
        raw_contents.len(),
        album_id,
        limit
    );

    let results: Vec<Option<EncryptedObject>> =
        stream::iter(raw_contents.iter().enumerate().map(|(index, encoded)| {
            async move {
                match encrypt_one(encryptor, album_id, encoded).await {
                    Ok(obj) => Some(obj),
                    Err(e) => {
                        warn!("Dropping content item {}: {}", index, e);
                        None
                    }
                }
            }
        }))
        .buffered(limit)
        .collect()
        .await;

    let total = results.len();
    let encrypted: Vec<EncryptedObject> = results.into_iter().flatten().collect();
    let dropped = total - encrypted.len();
    (encrypted, dropped)
}

async fn encrypt_one<E: Encryptor>(
    encryptor: &E,
    album_id: &str,
    encoded: &str,
) -> anyhow::Result<EncryptedObject> {
    let plaintext = BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| anyhow::anyhow!("content is not valid base64: {}", e))?;
    let identity = seal::fresh_identity(album_id)?;
    Ok(encryptor.encrypt(&identity, &plaintext).await?)
}

/// Upload ciphertexts strictly in order, one at a time. A failed upload is
/// dropped from the result; survivors keep their order.
pub async fn publish_blobs<B: BlobStore>(
    blob_store: &B,
    encrypted: Vec<EncryptedObject>,
    params: &StoreBlobParams,
) -> (Vec<PublishedBlobRecord>, usize) {
    let mut records = Vec::with_capacity(encrypted.len());
    let mut dropped = 0;

    for (index, object) in encrypted.into_iter().enumerate() {
        match blob_store.store(object.ciphertext, params.clone()).await {
            Ok(attestation) => {
                debug!("Item {} stored as blob {}", index, attestation.blob_id);
                records.push(attestation_to_record(attestation));
            }
            Err(e) => {
                error!("Dropping item {}: upload failed: {}", index, e);
                dropped += 1;
            }
        }
    }

    (records, dropped)
}

/// Run both stages and report per-stage drops.
pub async fn publish_contents<E: Encryptor, B: BlobStore>(
    encryptor: &E,
    blob_store: &B,
    album_id: &str,
    raw_contents: &[String],
    params: &StoreBlobParams,
) -> PublishOutcome {
    let (encrypted, dropped_encrypt) = encrypt_contents(encryptor, album_id, raw_contents).await;
    let (records, dropped_upload) = publish_blobs(blob_store, encrypted, params).await;

    if dropped_encrypt + dropped_upload > 0 {
        warn!(
            "Album {}: {} of {} items dropped ({} at encryption, {} at upload)",
            album_id,
            dropped_encrypt + dropped_upload,
            raw_contents.len(),
            dropped_encrypt,
            dropped_upload
        );
    }

    PublishOutcome {
        records,
        dropped_encrypt,
        dropped_upload,
    }
}

/// Flatten a storage attestation into the record persisted on the album.
/// New records always start unpublished.
pub fn attestation_to_record(attestation: BlobAttestation) -> PublishedBlobRecord {
    let resource_operation = if attestation.resource_operation.is_null() {
        json!({ "synthesized": true })
    } else {
        attestation.resource_operation
    };

    PublishedBlobRecord {
        blob_id: attestation.blob_id,
        registered_epoch: attestation.registered_epoch,
        certified_epoch: attestation.certified_epoch,
        size: attestation.size,
        storage: StorageWindow {
            start_epoch: attestation.start_epoch,
            end_epoch: attestation.end_epoch,
        },
        deletable: attestation.deletable,
        cost: attestation.cost,
        resource_operation,
        is_published: false,
    }
}
