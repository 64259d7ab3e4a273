pub mod client;
pub mod error;
pub mod identity;

pub use client::{EncryptedObject, SealClient, SealConfig, DEFAULT_THRESHOLD};
pub use error::{Result, SealError};
pub use identity::{derive_identity, fresh_identity, NONCE_LEN};
