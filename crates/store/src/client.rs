use std::env;

use serde_json::json;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::model::{Album, AlbumStatus, CreatorProfile, PublishedBlobRecord};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("STORE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string()),
        }
    }
}

/// REST client for the document store holding album drafts, review state,
/// published-blob flags, and creator profiles.
///
/// Mutations are conditional: the album's version token travels as an
/// `If-Match` header and a 409 surfaces as [`StoreError::VersionConflict`],
/// so concurrent confirmations cannot silently lose updates.
pub struct StoreClient {
    config: StoreConfig,
    client: reqwest::Client,
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Submit a new album draft; the store assigns the initial version.
    pub async fn create_draft(&self, album: &Album) -> Result<Album> {
        debug!("Creating draft for album {}", album.id);
        let response = self
            .client
            .post(self.url("/albums"))
            .json(album)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        parse_album_response(response, &album.id).await
    }

    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        let response = self
            .client
            .get(self.url(&format!("/albums/{}", album_id)))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        parse_album_response(response, album_id).await
    }

    pub async fn albums_by_owner(&self, owner: &str) -> Result<Vec<Album>> {
        let response = self
            .client
            .get(self.url("/albums"))
            .query(&[("owner", owner)])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        parse_json(response).await
    }

    /// Albums awaiting review, for the approver side.
    pub async fn pending_approvals(&self) -> Result<Vec<Album>> {
        let response = self
            .client
            .get(self.url("/albums"))
            .query(&[("status", "pending-approval")])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        parse_json(response).await
    }

    /// Patch an album's review status, conditional on its version.
    pub async fn set_status(
        &self,
        album_id: &str,
        status: AlbumStatus,
        version: u64,
    ) -> Result<Album> {
        debug!("Setting album {} status to {:?}", album_id, status);
        let response = self
            .client
            .patch(self.url(&format!("/albums/{}/status", album_id)))
            .header("If-Match", version.to_string())
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_conflict(&response, album_id, version)?;
        parse_album_response(response, album_id).await
    }

    /// Replace the album's published-blob records (publish pipeline output)
    /// and clear the consumed raw contents.
    pub async fn set_published_blobs(
        &self,
        album_id: &str,
        records: &[PublishedBlobRecord],
        version: u64,
    ) -> Result<Album> {
        debug!(
            "Persisting {} blob records on album {}",
            records.len(),
            album_id
        );
        let response = self
            .client
            .put(self.url(&format!("/albums/{}/blobs", album_id)))
            .header("If-Match", version.to_string())
            .json(&json!({ "publishedBlobs": records, "rawContents": [] }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_conflict(&response, album_id, version)?;
        parse_album_response(response, album_id).await
    }

    /// Flip one blob's published flag, conditional on the album version.
    pub async fn confirm_blob_published(
        &self,
        album_id: &str,
        blob_id: &str,
        version: u64,
    ) -> Result<Album> {
        debug!("Confirming blob {} on album {}", blob_id, album_id);
        let response = self
            .client
            .patch(self.url(&format!("/albums/{}/blobs/{}", album_id, blob_id)))
            .header("If-Match", version.to_string())
            .json(&json!({ "isPublished": true }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_conflict(&response, album_id, version)?;
        parse_album_response(response, album_id).await
    }

    pub async fn get_profile(&self, address: &str) -> Result<CreatorProfile> {
        let response = self
            .client
            .get(self.url(&format!("/profiles/{}", address)))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound(address.to_string()));
        }
        parse_json(response).await
    }

    /// Update a profile; an avatar file turns the request into multipart.
    pub async fn update_profile(
        &self,
        profile: &CreatorProfile,
        avatar: Option<(String, Vec<u8>)>,
    ) -> Result<CreatorProfile> {
        let url = self.url(&format!("/profiles/{}", profile.address));
        let response = match avatar {
            Some((filename, bytes)) => {
                let form = reqwest::multipart::Form::new()
                    .text(
                        "profile",
                        serde_json::to_string(profile)
                            .map_err(|e| StoreError::ParseError(e.to_string()))?,
                    )
                    .part(
                        "avatar",
                        reqwest::multipart::Part::bytes(bytes).file_name(filename),
                    );
                self.client.put(url).multipart(form).send().await
            }
            None => self.client.put(url).json(profile).send().await,
        }
        .map_err(|e| StoreError::Transport(e.to_string()))?;
        parse_json(response).await
    }
}

fn check_conflict(response: &reqwest::Response, album_id: &str, version: u64) -> Result<()> {
    if response.status().as_u16() == 409 {
        return Err(StoreError::VersionConflict {
            album_id: album_id.to_string(),
            version,
        });
    }
    Ok(())
}

async fn parse_album_response(response: reqwest::Response, album_id: &str) -> Result<Album> {
    if response.status().as_u16() == 404 {
        return Err(StoreError::NotFound(album_id.to_string()));
    }
    parse_json(response).await
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json()
        .await
        .map_err(|e| StoreError::ParseError(e.to_string()))
}
