use store::AlbumStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Encryption error: {0}")]
    SealError(#[from] seal::SealError),

    #[error("Storage network error: {0}")]
    WalrusError(#[from] walrus::WalrusError),

    #[error("Ledger error: {0}")]
    SuiError(#[from] sui::SuiInterfaceError),

    #[error("Document store error: {0}")]
    StoreError(#[from] store::StoreError),

    #[error("Album {album_id} is {status:?}; publishing requires approval")]
    NotApproved {
        album_id: String,
        status: AlbumStatus,
    },

    #[error("Album {0} has no content to publish")]
    NoContents(String),

    #[error("Album creation transaction did not succeed: {0}")]
    AlbumCreateFailed(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CuratorError>;
