use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Album access tier, ordered from cheapest up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Standard,
    Premium,
    Exclusive,
    Principle,
}

/// Album review state. Transitions are monotonic:
/// Draft -> PendingApproval -> {Approved | Rejected}; Rejected is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlbumStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl AlbumStatus {
    pub fn can_transition_to(self, to: AlbumStatus) -> bool {
        matches!(
            (self, to),
            (AlbumStatus::Draft, AlbumStatus::PendingApproval)
                | (AlbumStatus::PendingApproval, AlbumStatus::Approved)
                | (AlbumStatus::PendingApproval, AlbumStatus::Rejected)
        )
    }
}

/// Storage window a blob is paid for, in storage-network epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageWindow {
    pub start_epoch: u64,
    pub end_epoch: u64,
}

/// One successfully stored blob belonging to an album.
///
/// Created once per upload and never mutated afterwards, except
/// `is_published`, which flips false -> true exactly once when the publish
/// transaction confirms on-chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedBlobRecord {
    pub blob_id: String,
    pub registered_epoch: u64,
    pub certified_epoch: Option<u64>,
    pub size: u64,
    pub storage: StorageWindow,
    pub deletable: bool,
    pub cost: u64,
    pub resource_operation: Value,
    pub is_published: bool,
}

/// An album document as stored: the draft, its review state, and the blobs
/// published for it. `raw_contents` is transient; the publish pipeline
/// consumes it once and replaces it with `published_blobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub owner: String,
    pub cap_id: String,
    pub name: String,
    pub tier: Tier,
    /// Price in the smallest currency unit (MIST).
    pub price: u64,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub status: AlbumStatus,
    pub content_refs: Vec<String>,
    #[serde(default)]
    pub raw_contents: Vec<String>,
    #[serde(default)]
    pub published_blobs: Vec<PublishedBlobRecord>,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency token maintained by the document store.
    #[serde(default)]
    pub version: u64,
}

impl Album {
    /// Apply a status change, rejecting anything non-monotonic.
    pub fn transition_to(&mut self, to: AlbumStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Flip a blob's published flag. Returns false when the blob was already
    /// published, so re-confirmation is a no-op rather than an error.
    pub fn mark_blob_published(&mut self, blob_id: &str) -> Result<bool> {
        let record = self
            .published_blobs
            .iter_mut()
            .find(|r| r.blob_id == blob_id)
            .ok_or_else(|| StoreError::UnknownBlob {
                album_id: self.id.clone(),
                blob_id: blob_id.to_string(),
            })?;
        if record.is_published {
            return Ok(false);
        }
        record.is_published = true;
        Ok(true)
    }

    /// Blobs still awaiting an on-chain publish confirmation.
    pub fn unpublished_blobs(&self) -> impl Iterator<Item = &PublishedBlobRecord> {
        self.published_blobs.iter().filter(|r| !r.is_published)
    }
}

/// Creator-facing profile document; the avatar travels as a multipart file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub address: String,
    pub display_name: String,
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album() -> Album {
        Album {
            id: "0xa1".to_string(),
            owner: "0xowner".to_string(),
            cap_id: "0xc1".to_string(),
            name: "First Light".to_string(),
            tier: Tier::Premium,
            price: 5_000_000,
            description: String::new(),
            tags: BTreeSet::new(),
            status: AlbumStatus::Draft,
            content_refs: vec![],
            raw_contents: vec![],
            published_blobs: vec![record("B1"), record("B2")],
            created_at: Utc::now(),
            version: 1,
        }
    }

    fn record(blob_id: &str) -> PublishedBlobRecord {
        PublishedBlobRecord {
            blob_id: blob_id.to_string(),
            registered_epoch: 10,
            certified_epoch: Some(11),
            size: 64,
            storage: StorageWindow {
                start_epoch: 10,
                end_epoch: 20,
            },
            deletable: false,
            cost: 100,
            resource_operation: json!({}),
            is_published: false,
        }
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Standard < Tier::Premium);
        assert!(Tier::Premium < Tier::Exclusive);
        assert!(Tier::Exclusive < Tier::Principle);
    }

    #[test]
    fn only_monotonic_transitions_are_allowed() {
        let mut a = album();
        a.transition_to(AlbumStatus::PendingApproval).unwrap();
        a.transition_to(AlbumStatus::Approved).unwrap();

        // Approved is final for the review flow
        assert!(a.transition_to(AlbumStatus::Draft).is_err());
        assert!(a.transition_to(AlbumStatus::Rejected).is_err());

        let mut b = album();
        // Draft cannot jump straight to Approved
        assert!(b.transition_to(AlbumStatus::Approved).is_err());
        b.transition_to(AlbumStatus::PendingApproval).unwrap();
        b.transition_to(AlbumStatus::Rejected).unwrap();
        // Rejected is terminal
        assert!(b.transition_to(AlbumStatus::PendingApproval).is_err());
    }

    #[test]
    fn publish_flag_flips_once_and_stays() {
        let mut a = album();
        assert!(a.mark_blob_published("B1").unwrap());
        assert!(!a.mark_blob_published("B1").unwrap());
        assert!(a.published_blobs[0].is_published);
        assert!(!a.published_blobs[1].is_published);
        assert_eq!(a.unpublished_blobs().count(), 1);
    }

    #[test]
    fn unknown_blob_is_an_error() {
        let mut a = album();
        assert!(matches!(
            a.mark_blob_published("nope"),
            Err(StoreError::UnknownBlob { .. })
        ));
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(AlbumStatus::PendingApproval).unwrap(),
            json!("pending-approval")
        );
    }
}
