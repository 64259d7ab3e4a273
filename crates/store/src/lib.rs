pub mod client;
pub mod error;
pub mod model;

pub use client::{StoreClient, StoreConfig};
pub use error::{Result, StoreError};
pub use model::{
    Album, AlbumStatus, CreatorProfile, PublishedBlobRecord, StorageWindow, Tier,
};
