use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("Invalid album id '{id}': {reason}")]
    InvalidAlbumId { id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to key-server daemon failed: {0}")]
    Transport(String),

    #[error("Key-server daemon returned {status}: {reason}")]
    Daemon { status: u16, reason: String },

    #[error("Failed to parse daemon response: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SealError>;
