use thiserror::Error;

use crate::model::AlbumStatus;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request to document store failed: {0}")]
    Transport(String),

    #[error("Document store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Album {0} not found")]
    NotFound(String),

    #[error("Version conflict updating album {album_id}: document changed since version {version}")]
    VersionConflict { album_id: String, version: u64 },

    #[error("Invalid status transition {from:?} -> {to:?}")]
    InvalidTransition { from: AlbumStatus, to: AlbumStatus },

    #[error("Unknown blob {blob_id} on album {album_id}")]
    UnknownBlob { album_id: String, blob_id: String },

    #[error("Failed to parse store response: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
