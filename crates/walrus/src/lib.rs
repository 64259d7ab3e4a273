pub mod attestation;
pub mod client;
pub mod error;

pub use attestation::{normalize_store_response, BlobAttestation};
pub use client::{Daemon, StoreBlobParams, WalrusClient, WalrusConfig};
pub use error::{Result, WalrusError};
