use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use serde_json::Value;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

use crate::attestation::{normalize_store_response, BlobAttestation};
use crate::error::{Result, WalrusError};

const BASE_RETRY_DELAY_SECS: u64 = 5;

/// Get the maximum number of attempts for Walrus writes from env var or default
fn get_max_retries() -> u32 {
    static MAX_RETRIES_CACHE: OnceLock<u32> = OnceLock::new();
    *MAX_RETRIES_CACHE.get_or_init(|| {
        env::var("WALRUS_MAX_RETRIES")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<u32>()
            .unwrap_or(4)
    })
}

#[derive(Debug, Clone, Default)]
pub enum Daemon {
    Local,
    #[default]
    Testnet,
}

#[derive(Debug, Clone)]
pub struct WalrusConfig {
    pub daemon: Daemon,
    pub min_epochs: u32,
    pub max_epochs: u32,
}

impl Default for WalrusConfig {
    fn default() -> Self {
        Self {
            daemon: Daemon::Testnet,
            min_epochs: 2,
            max_epochs: 53,
        }
    }
}

impl WalrusConfig {
    pub fn base_publisher_url(&self) -> String {
        match self.daemon {
            Daemon::Local => "http://127.0.0.1:31415".to_string(),
            Daemon::Testnet => env::var("WALRUS_PUBLISHER")
                .unwrap_or_else(|_| "https://wal-publisher-testnet.staketab.org".to_string()),
        }
    }

    pub fn reader_url(&self) -> String {
        match self.daemon {
            Daemon::Local => "http://127.0.0.1:31415/v1/blobs/".to_string(),
            Daemon::Testnet => env::var("WALRUS_AGGREGATOR").unwrap_or_else(|_| {
                "https://wal-aggregator-testnet.staketab.org/v1/blobs/".to_string()
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreBlobParams {
    /// Storage duration in epochs, clamped to the configured window.
    pub epochs: Option<u32>,
    /// Address the blob's Sui object should be sent to, if any.
    pub send_object_to: Option<String>,
    /// Whether the blob may be deleted before its storage window ends.
    pub deletable: bool,
}

impl Default for StoreBlobParams {
    fn default() -> Self {
        Self {
            epochs: None,
            send_object_to: None,
            deletable: false,
        }
    }
}

pub struct WalrusClient {
    config: WalrusConfig,
    client: reqwest::Client,
}

impl WalrusClient {
    pub fn new() -> Self {
        Self {
            config: WalrusConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_config(config: WalrusConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Store one ciphertext on the storage network and return its attestation.
    ///
    /// Transport failures and server errors are retried with exponential
    /// backoff; client errors and unrecognized response shapes are not.
    pub async fn store_blob(&self, data: Vec<u8>, params: StoreBlobParams) -> Result<BlobAttestation> {
        let payload_size = data.len() as u64;
        let epochs = params
            .epochs
            .unwrap_or(self.config.min_epochs)
            .clamp(self.config.min_epochs, self.config.max_epochs);

        let mut url = format!(
            "{}/v1/blobs?epochs={}",
            self.config.base_publisher_url(),
            epochs
        );
        if let Some(ref addr) = params.send_object_to {
            url.push_str(&format!("&send_object_to={}", addr));
        }
        if params.deletable {
            url.push_str("&deletable=true");
        }

        let max_retries = get_max_retries();

        for attempt in 1..=max_retries {
            debug!("Writing blob to Walrus (attempt {}/{})", attempt, max_retries);
            let start = Instant::now();

            // body() consumes the payload, so each attempt gets its own copy
            let response = match self.client.put(&url).body(data.clone()).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt < max_retries {
                        let retry_delay = retry_delay_secs(attempt);
                        warn!(
                            "Failed to send blob to Walrus (attempt {}/{}): {}. Retrying in {} seconds...",
                            attempt, max_retries, e, retry_delay
                        );
                        sleep(Duration::from_secs(retry_delay)).await;
                        continue;
                    }
                    error!("Failed to send blob to Walrus after {} attempts: {}", max_retries, e);
                    return Err(WalrusError::Transport {
                        attempts: max_retries,
                        message: e.to_string(),
                    });
                }
            };

            debug!("Walrus write request completed in {:?}", start.elapsed());

            if response.status().is_success() {
                let info: Value = response
                    .json()
                    .await
                    .map_err(|e| WalrusError::ParseError(e.to_string()))?;
                let attestation = normalize_store_response(&info, payload_size)?;
                debug!("Walrus blobId: {}", attestation.blob_id);
                return Ok(attestation);
            }

            let status = response.status();
            let reason = status.canonical_reason().unwrap_or("Unknown error");

            if status.is_server_error() && attempt < max_retries {
                let retry_delay = retry_delay_secs(attempt);
                warn!(
                    "Walrus returned {} {} (attempt {}/{}). Retrying in {} seconds...",
                    status, reason, attempt, max_retries, retry_delay
                );
                sleep(Duration::from_secs(retry_delay)).await;
                continue;
            }

            error!("Walrus store failed: {} {}. Not retrying.", status, reason);
            return Err(WalrusError::Daemon {
                status: status.as_u16(),
                reason: reason.to_string(),
            });
        }

        Err(WalrusError::Transport {
            attempts: max_retries,
            message: "exhausted retries".to_string(),
        })
    }

    /// Read a blob back through the aggregator.
    pub async fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>> {
        if blob_id.is_empty() {
            return Err(WalrusError::MissingBlobId);
        }

        debug!("Reading walrus blob: {}", blob_id);
        let start = Instant::now();

        let url = format!("{}{}", self.config.reader_url(), blob_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WalrusError::Transport {
                attempts: 1,
                message: e.to_string(),
            })?;

        debug!("Walrus read completed in {:?}", start.elapsed());

        if response.status().is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| WalrusError::ParseError(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            let status = response.status();
            error!(
                "Walrus read failed: {} {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            );
            Err(WalrusError::Daemon {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            })
        }
    }

    /// Public aggregator URL for a stored blob.
    pub fn blob_url(&self, blob_id: &str) -> Result<String> {
        if blob_id.is_empty() {
            return Err(WalrusError::MissingBlobId);
        }
        Ok(format!("{}{}", self.config.reader_url(), blob_id))
    }
}

impl Default for WalrusClient {
    fn default() -> Self {
        Self::new()
    }
}

fn retry_delay_secs(attempt: u32) -> u64 {
    BASE_RETRY_DELAY_SECS * 2_u64.pow(attempt - 1)
}
