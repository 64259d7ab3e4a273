use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use store::{Album, AlbumStatus, PublishedBlobRecord, StoreError, Tier};
use sui::TxStatus;
use walrus::StoreBlobParams;

use crate::clients::{AlbumStore, BlobStore, Encryptor, Ledger};
use crate::config::CuratorConfig;
use crate::error::{CuratorError, Result};
use crate::pipeline::{publish_contents, PublishOutcome};

/// Input for minting a new album.
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub name: String,
    pub tier: Tier,
    pub price: u64,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub content_refs: Vec<String>,
    /// Base64-encoded content payloads, consumed once by `publish_album`.
    pub raw_contents: Vec<String>,
}

/// Outcome of one publish-confirmation attempt, per blob.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Published,
    /// The blob was already published; nothing was submitted.
    AlreadyPublished,
    /// The transaction executed and failed; the blob stays unpublished and
    /// the confirmation can be retried.
    TxFailed { reason: String },
    SignerRejected,
}

/// Sequences the album lifecycle: on-chain creation, draft review,
/// encrypt-and-upload, and per-blob publish confirmation.
pub struct Curator<E, B, L, S> {
    encryptor: E,
    blobs: B,
    ledger: L,
    store: S,
    config: CuratorConfig,
}

impl<E, B, L, S> Curator<E, B, L, S>
where
    E: Encryptor,
    B: BlobStore,
    L: Ledger,
    S: AlbumStore,
{
    pub fn new(encryptor: E, blobs: B, ledger: L, store: S, config: CuratorConfig) -> Self {
        Self {
            encryptor,
            blobs,
            ledger,
            store,
            config,
        }
    }

    /// Mint the album on-chain and write the draft document.
    ///
    /// The create transaction must produce a shared album object and an
    /// address-owned cap; their ids seed the draft.
    pub async fn create_album(&self, draft: NewAlbum) -> Result<Album> {
        let (status, creation) = self
            .ledger
            .create_album(&draft.name, draft.price)
            .await?;

        let creation = match (status, creation) {
            (TxStatus::Approved { digest }, Some(creation)) => {
                info!(
                    "Album {} created on-chain (cap {}, tx {})",
                    creation.album_id, creation.cap_id, digest
                );
                creation
            }
            (TxStatus::Failed { reason, .. }, _) => {
                return Err(CuratorError::AlbumCreateFailed(reason));
            }
            (TxStatus::RejectedBySigner, _) => {
                return Err(CuratorError::AlbumCreateFailed(
                    "rejected by signer".to_string(),
                ));
            }
            (TxStatus::Approved { .. }, None) => {
                return Err(CuratorError::AlbumCreateFailed(
                    "transaction succeeded but created objects were missing".to_string(),
                ));
            }
        };

        let album = Album {
            id: creation.album_id,
            owner: self.ledger.sender().unwrap_or_default().to_string(),
            cap_id: creation.cap_id,
            name: draft.name,
            tier: draft.tier,
            price: draft.price,
            description: draft.description,
            tags: draft.tags,
            status: AlbumStatus::Draft,
            content_refs: draft.content_refs,
            raw_contents: draft.raw_contents,
            published_blobs: Vec::new(),
            created_at: Utc::now(),
            version: 0,
        };

        Ok(self.store.create_draft(&album).await?)
    }

    /// Freeze the draft and hand it to the approvers.
    pub async fn submit_for_approval(&self, album_id: &str) -> Result<Album> {
        self.transition(album_id, AlbumStatus::PendingApproval).await
    }

    pub async fn approve(&self, album_id: &str) -> Result<Album> {
        self.transition(album_id, AlbumStatus::Approved).await
    }

    pub async fn reject(&self, album_id: &str) -> Result<Album> {
        self.transition(album_id, AlbumStatus::Rejected).await
    }

    async fn transition(&self, album_id: &str, to: AlbumStatus) -> Result<Album> {
        let album = self.store.get_album(album_id).await?;
        if !album.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                from: album.status,
                to,
            }
            .into());
        }
        Ok(self.store.set_status(album_id, to, album.version).await?)
    }

    /// Encrypt and upload the album's raw contents, then persist the
    /// resulting records (all unpublished) on the album document.
    ///
    /// Both stages are best-effort; the outcome reports dropped items and
    /// the persisted record list may be shorter than the input.
    pub async fn publish_album(&self, album_id: &str) -> Result<(Album, PublishOutcome)> {
        let album = self.store.get_album(album_id).await?;
        if album.status != AlbumStatus::Approved {
            return Err(CuratorError::NotApproved {
                album_id: album_id.to_string(),
                status: album.status,
            });
        }
        if album.raw_contents.is_empty() {
            return Err(CuratorError::NoContents(album_id.to_string()));
        }

        let params = StoreBlobParams {
            epochs: self.config.epochs,
            send_object_to: None,
            deletable: self.config.deletable,
        };
        let outcome = publish_contents(
            &self.encryptor,
            &self.blobs,
            &album.id,
            &album.raw_contents,
            &params,
        )
        .await;

        let updated = self
            .store
            .set_published_blobs(album_id, &outcome.records, album.version)
            .await?;
        Ok((updated, outcome))
    }

    /// Submit the on-chain publish transaction for one blob and, if it is
    /// approved, flip the record's published flag.
    ///
    /// Idempotent per blob: an already-published blob is skipped without a
    /// transaction, and any failure leaves the record unpublished so the
    /// caller can retry.
    pub async fn confirm_blob(&self, album_id: &str, blob_id: &str) -> Result<ConfirmOutcome> {
        let album = self.store.get_album(album_id).await?;
        let record = album
            .published_blobs
            .iter()
            .find(|r| r.blob_id == blob_id)
            .ok_or_else(|| StoreError::UnknownBlob {
                album_id: album_id.to_string(),
                blob_id: blob_id.to_string(),
            })?;
        if record.is_published {
            debug!("Blob {} already published; skipping", blob_id);
            return Ok(ConfirmOutcome::AlreadyPublished);
        }

        let cap_id = if album.cap_id.is_empty() {
            self.ledger.find_album_cap(&album.owner, &album.id).await?
        } else {
            album.cap_id.clone()
        };

        match self.ledger.publish_blob(&album.id, &cap_id, blob_id).await? {
            TxStatus::Approved { digest } => {
                info!("Blob {} published on-chain (tx {})", blob_id, digest);
                self.store
                    .confirm_blob_published(album_id, blob_id, album.version)
                    .await?;
                Ok(ConfirmOutcome::Published)
            }
            TxStatus::Failed { reason, digest } => {
                warn!(
                    "Publish transaction for blob {} failed: {} (tx: {})",
                    blob_id,
                    reason,
                    digest.as_deref().unwrap_or("unknown")
                );
                Ok(ConfirmOutcome::TxFailed { reason })
            }
            TxStatus::RejectedBySigner => Ok(ConfirmOutcome::SignerRejected),
        }
    }

    /// Attempt confirmation for every blob still unpublished.
    pub async fn confirm_all(&self, album_id: &str) -> Result<Vec<(String, ConfirmOutcome)>> {
        let pending = self.list_unpublished(album_id).await?;
        let mut outcomes = Vec::with_capacity(pending.len());
        for record in pending {
            let outcome = self.confirm_blob(album_id, &record.blob_id).await?;
            outcomes.push((record.blob_id, outcome));
        }
        Ok(outcomes)
    }

    /// Read one of the album's uploaded ciphertexts back from the storage
    /// network. The blob must belong to the album's records; decryption is
    /// the viewer's business.
    pub async fn fetch_blob(&self, album_id: &str, blob_id: &str) -> Result<Vec<u8>> {
        let album = self.store.get_album(album_id).await?;
        if !album.published_blobs.iter().any(|r| r.blob_id == blob_id) {
            return Err(StoreError::UnknownBlob {
                album_id: album_id.to_string(),
                blob_id: blob_id.to_string(),
            }
            .into());
        }
        debug!("Fetching blob {} of album {}", blob_id, album_id);
        Ok(self.blobs.retrieve(blob_id).await?)
    }

    /// Blobs still awaiting confirmation; the retry surface for the UI.
    pub async fn list_unpublished(&self, album_id: &str) -> Result<Vec<PublishedBlobRecord>> {
        let album = self.store.get_album(album_id).await?;
        Ok(album.unpublished_blobs().cloned().collect())
    }

    pub async fn albums_by_owner(&self, owner: &str) -> Result<Vec<Album>> {
        Ok(self.store.albums_by_owner(owner).await?)
    }

    pub async fn pending_approvals(&self) -> Result<Vec<Album>> {
        Ok(self.store.pending_approvals().await?)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn encryptor(&self) -> &E {
        &self.encryptor
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}
