use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiInterfaceError {
    #[error("RPC connection failed: {0}")]
    RpcConnectionError(String),

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("No album cap owned by {owner} for album {album_id}")]
    CapNotFound { owner: String, album_id: String },

    #[error("Invalid object format: {0}")]
    InvalidObjectFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Key error: {0}")]
    KeyError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SuiInterfaceError>;
