use std::env;
use std::time::Instant;

use base64::prelude::*;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::{Result, SealError};

/// Default secret-sharing threshold; a deployment parameter, not per-call.
pub const DEFAULT_THRESHOLD: u8 = 2;

#[derive(Debug, Clone)]
pub struct SealConfig {
    /// Move package holding the access policy the ciphertexts are bound to.
    pub policy_package_id: String,
    pub threshold: u8,
    pub daemon_url: String,
}

impl SealConfig {
    /// Build a config from the environment: `SEAL_POLICY_PACKAGE` (falling
    /// back to `policy_fallback` when unset), `SEAL_THRESHOLD` and
    /// `SEAL_DAEMON` (defaulted).
    pub fn from_env(policy_fallback: Option<&str>) -> Result<Self> {
        let policy_package_id = env::var("SEAL_POLICY_PACKAGE")
            .ok()
            .or_else(|| policy_fallback.map(str::to_string))
            .ok_or_else(|| {
                SealError::Config("SEAL_POLICY_PACKAGE environment variable not set".to_string())
            })?;
        let threshold = env::var("SEAL_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(DEFAULT_THRESHOLD);
        let daemon_url =
            env::var("SEAL_DAEMON").unwrap_or_else(|_| "http://127.0.0.1:2024".to_string());
        Ok(Self {
            policy_package_id,
            threshold,
            daemon_url,
        })
    }
}

/// Ciphertext plus the identity it was encrypted under.
///
/// Lives only between encryption and upload; after the upload succeeds the
/// attestation is all that survives.
#[derive(Debug, Clone)]
pub struct EncryptedObject {
    pub identity: String,
    pub ciphertext: Vec<u8>,
}

/// Client for the threshold-encryption daemon fronting the key-server
/// network. The cryptography itself is the daemon's business; this client
/// only ships plaintext in and ciphertext out.
pub struct SealClient {
    config: SealConfig,
    client: reqwest::Client,
}

impl SealClient {
    pub fn new(config: SealConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    /// Encrypt one plaintext under the given identity and the configured
    /// policy package.
    pub async fn encrypt(&self, identity: &str, plaintext: &[u8]) -> Result<EncryptedObject> {
        let url = format!("{}/v1/encrypt", self.config.daemon_url);
        let body = json!({
            "threshold": self.config.threshold,
            "packageId": self.config.policy_package_id,
            "id": identity,
            "data": BASE64_STANDARD.encode(plaintext),
        });

        debug!("Encrypting {} bytes under identity {}", plaintext.len(), identity);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SealError::Transport(e.to_string()))?;

        debug!("Encryption request completed in {:?}", start.elapsed());

        if !response.status().is_success() {
            let status = response.status();
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            error!("Seal encrypt failed: {} {}", status, reason);
            return Err(SealError::Daemon {
                status: status.as_u16(),
                reason: reason.to_string(),
            });
        }

        let info: Value = response
            .json()
            .await
            .map_err(|e| SealError::ParseError(e.to_string()))?;

        let encoded = info
            .get("encryptedObject")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SealError::ParseError("response missing encryptedObject field".to_string())
            })?;
        let ciphertext = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| SealError::ParseError(e.to_string()))?;

        Ok(EncryptedObject {
            identity: identity.to_string(),
            ciphertext,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var is never touched concurrently.
    #[test]
    fn config_resolves_policy_package_or_fails() {
        env::remove_var("SEAL_POLICY_PACKAGE");

        match SealConfig::from_env(None) {
            Err(SealError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other),
        }

        let config = SealConfig::from_env(Some("0xfallback")).unwrap();
        assert_eq!(config.policy_package_id, "0xfallback");
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);

        env::set_var("SEAL_POLICY_PACKAGE", "0xpolicy");
        let config = SealConfig::from_env(Some("0xfallback")).unwrap();
        assert_eq!(config.policy_package_id, "0xpolicy");
        env::remove_var("SEAL_POLICY_PACKAGE");
    }
}
