//! Narrow seams over the external clients the orchestrator depends on.
//!
//! Each trait covers exactly the calls this system makes, so tests can
//! substitute in-process fakes for the chain, the key servers, the storage
//! network, and the document store.

use async_trait::async_trait;
use serde_json::json;

use seal::{EncryptedObject, SealClient, SealError};
use store::{Album, AlbumStatus, CreatorProfile, PublishedBlobRecord, StoreClient, StoreError};
use sui::{AlbumCreation, MoveCall, SuiInterface, SuiInterfaceError, TxStatus};
use walrus::{BlobAttestation, StoreBlobParams, WalrusClient, WalrusError};

#[async_trait]
pub trait Encryptor: Send + Sync {
    async fn encrypt(
        &self,
        identity: &str,
        plaintext: &[u8],
    ) -> std::result::Result<EncryptedObject, SealError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(
        &self,
        data: Vec<u8>,
        params: StoreBlobParams,
    ) -> std::result::Result<BlobAttestation, WalrusError>;

    /// Read a stored blob back through the aggregator.
    async fn retrieve(&self, blob_id: &str) -> std::result::Result<Vec<u8>, WalrusError>;
}

#[async_trait]
pub trait Ledger: Send + Sync {
    fn sender(&self) -> Option<&str>;

    /// Submit the album-create transaction. The status is always returned as
    /// a value; the creation ids are present only when it succeeded.
    async fn create_album(
        &self,
        name: &str,
        price: u64,
    ) -> std::result::Result<(TxStatus, Option<AlbumCreation>), SuiInterfaceError>;

    /// Submit the publish transaction for one blob.
    async fn publish_blob(
        &self,
        album_id: &str,
        cap_id: &str,
        blob_id: &str,
    ) -> std::result::Result<TxStatus, SuiInterfaceError>;

    async fn find_album_cap(
        &self,
        owner: &str,
        album_id: &str,
    ) -> std::result::Result<String, SuiInterfaceError>;
}

#[async_trait]
pub trait AlbumStore: Send + Sync {
    async fn create_draft(&self, album: &Album) -> std::result::Result<Album, StoreError>;
    async fn get_album(&self, album_id: &str) -> std::result::Result<Album, StoreError>;
    async fn albums_by_owner(&self, owner: &str) -> std::result::Result<Vec<Album>, StoreError>;
    async fn pending_approvals(&self) -> std::result::Result<Vec<Album>, StoreError>;
    async fn set_status(
        &self,
        album_id: &str,
        status: AlbumStatus,
        version: u64,
    ) -> std::result::Result<Album, StoreError>;
    async fn set_published_blobs(
        &self,
        album_id: &str,
        records: &[PublishedBlobRecord],
        version: u64,
    ) -> std::result::Result<Album, StoreError>;
    async fn confirm_blob_published(
        &self,
        album_id: &str,
        blob_id: &str,
        version: u64,
    ) -> std::result::Result<Album, StoreError>;
    async fn get_profile(&self, address: &str)
        -> std::result::Result<CreatorProfile, StoreError>;
    async fn update_profile(
        &self,
        profile: &CreatorProfile,
        avatar: Option<(String, Vec<u8>)>,
    ) -> std::result::Result<CreatorProfile, StoreError>;
}

#[async_trait]
impl Encryptor for SealClient {
    async fn encrypt(
        &self,
        identity: &str,
        plaintext: &[u8],
    ) -> std::result::Result<EncryptedObject, SealError> {
        SealClient::encrypt(self, identity, plaintext).await
    }
}

#[async_trait]
impl BlobStore for WalrusClient {
    async fn store(
        &self,
        data: Vec<u8>,
        params: StoreBlobParams,
    ) -> std::result::Result<BlobAttestation, WalrusError> {
        self.store_blob(data, params).await
    }

    async fn retrieve(&self, blob_id: &str) -> std::result::Result<Vec<u8>, WalrusError> {
        self.read_blob(blob_id).await
    }
}

/// The production ledger binding: the album Move package behind [`SuiInterface`].
pub struct ChainLedger {
    interface: SuiInterface,
    package: String,
}

impl ChainLedger {
    pub fn new(interface: SuiInterface, package: String) -> Self {
        Self { interface, package }
    }

    fn cap_type(&self) -> String {
        format!("{}::albums::AlbumCap", self.package)
    }
}

#[async_trait]
impl Ledger for ChainLedger {
    fn sender(&self) -> Option<&str> {
        self.interface.sender()
    }

    async fn create_album(
        &self,
        name: &str,
        price: u64,
    ) -> std::result::Result<(TxStatus, Option<AlbumCreation>), SuiInterfaceError> {
        let response = self
            .interface
            .execute_move_call(MoveCall {
                package: self.package.clone(),
                module: "albums".to_string(),
                function: "create_album".to_string(),
                type_args: vec![],
                args: vec![json!(name), json!(price.to_string())],
                gas_budget: None,
            })
            .await?;

        if !response.status.is_approved() {
            return Ok((response.status, None));
        }
        let creation = AlbumCreation::from_created(&response.created)?;
        Ok((response.status, Some(creation)))
    }

    async fn publish_blob(
        &self,
        album_id: &str,
        cap_id: &str,
        blob_id: &str,
    ) -> std::result::Result<TxStatus, SuiInterfaceError> {
        let response = self
            .interface
            .execute_move_call(MoveCall {
                package: self.package.clone(),
                module: "albums".to_string(),
                function: "publish_blob".to_string(),
                type_args: vec![],
                args: vec![json!(album_id), json!(cap_id), json!(blob_id)],
                gas_budget: None,
            })
            .await?;
        Ok(response.status)
    }

    async fn find_album_cap(
        &self,
        owner: &str,
        album_id: &str,
    ) -> std::result::Result<String, SuiInterfaceError> {
        sui::find_album_cap(self.interface.rpc(), owner, &self.cap_type(), album_id).await
    }
}

#[async_trait]
impl AlbumStore for StoreClient {
    async fn create_draft(&self, album: &Album) -> std::result::Result<Album, StoreError> {
        StoreClient::create_draft(self, album).await
    }

    async fn get_album(&self, album_id: &str) -> std::result::Result<Album, StoreError> {
        StoreClient::get_album(self, album_id).await
    }

    async fn albums_by_owner(&self, owner: &str) -> std::result::Result<Vec<Album>, StoreError> {
        StoreClient::albums_by_owner(self, owner).await
    }

    async fn pending_approvals(&self) -> std::result::Result<Vec<Album>, StoreError> {
        StoreClient::pending_approvals(self).await
    }

    async fn set_status(
        &self,
        album_id: &str,
        status: AlbumStatus,
        version: u64,
    ) -> std::result::Result<Album, StoreError> {
        StoreClient::set_status(self, album_id, status, version).await
    }

    async fn set_published_blobs(
        &self,
        album_id: &str,
        records: &[PublishedBlobRecord],
        version: u64,
    ) -> std::result::Result<Album, StoreError> {
        StoreClient::set_published_blobs(self, album_id, records, version).await
    }

    async fn confirm_blob_published(
        &self,
        album_id: &str,
        blob_id: &str,
        version: u64,
    ) -> std::result::Result<Album, StoreError> {
        StoreClient::confirm_blob_published(self, album_id, blob_id, version).await
    }

    async fn get_profile(
        &self,
        address: &str,
    ) -> std::result::Result<CreatorProfile, StoreError> {
        StoreClient::get_profile(self, address).await
    }

    async fn update_profile(
        &self,
        profile: &CreatorProfile,
        avatar: Option<(String, Vec<u8>)>,
    ) -> std::result::Result<CreatorProfile, StoreError> {
        StoreClient::update_profile(self, profile, avatar).await
    }
}
