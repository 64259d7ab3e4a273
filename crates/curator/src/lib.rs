pub mod clients;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipeline;

pub use clients::{AlbumStore, BlobStore, Encryptor, Ledger};
pub use config::CuratorConfig;
pub use error::{CuratorError, Result};
pub use orchestrator::{ConfirmOutcome, Curator, NewAlbum};
pub use pipeline::PublishOutcome;
