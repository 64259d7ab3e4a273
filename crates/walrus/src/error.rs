use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalrusError {
    #[error("Request failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    #[error("Walrus daemon returned {status}: {reason}")]
    Daemon { status: u16, reason: String },

    #[error("Unrecognized store response shape: {0}")]
    UnrecognizedShape(String),

    #[error("blob_id is not set")]
    MissingBlobId,

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, WalrusError>;
