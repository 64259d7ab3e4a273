use std::env;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Move package holding the albums module.
    pub package_id: String,
    /// Storage duration requested for published blobs, in epochs.
    pub epochs: Option<u32>,
    /// Whether published blobs may be deleted before their window ends.
    pub deletable: bool,
}

impl CuratorConfig {
    /// Build from the environment: `ALBUMS_PACKAGE` (required),
    /// `WALRUS_EPOCHS` and `WALRUS_DELETABLE` (defaulted).
    pub fn from_env() -> Result<Self> {
        let package_id = env::var("ALBUMS_PACKAGE")
            .map_err(|_| anyhow::anyhow!("ALBUMS_PACKAGE environment variable not set"))?;
        let epochs = env::var("WALRUS_EPOCHS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok());
        let deletable = env::var("WALRUS_DELETABLE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
        Ok(Self {
            package_id,
            epochs,
            deletable,
        })
    }
}
