use base64::prelude::*;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::chain::load_sender_from_env;
use crate::effects::{parse_created_objects, parse_status, CreatedObject, TxStatus};
use crate::error::{Result, SuiInterfaceError};
use crate::rpc::SuiRpcClient;

type Blake2b256 = Blake2b<U32>;

/// Fallback gas budget when the caller does not provide one (0.1 SUI)
pub const FALLBACK_GAS_BUDGET_MIST: u64 = 100_000_000;

/// A Move entry-point invocation with its ordered argument list.
#[derive(Debug, Clone)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_args: Vec<String>,
    pub args: Vec<Value>,
    pub gas_budget: Option<u64>,
}

/// Result of an executed transaction: status plus created objects.
#[derive(Debug, Clone)]
pub struct TxResponse {
    pub status: TxStatus,
    pub created: Vec<CreatedObject>,
}

/// Thin typed surface over the fullnode for the calls this system makes.
pub struct SuiInterface {
    rpc: SuiRpcClient,
    signer: Option<(String, SigningKey)>,
}

impl SuiInterface {
    /// Read-only interface; transactions will be rejected for lack of a signer.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc: SuiRpcClient::new(rpc_url),
            signer: None,
        }
    }

    /// Interface with the signer loaded from SUI_ADDRESS / SUI_SECRET_KEY.
    pub fn with_env_signer(rpc_url: impl Into<String>) -> Result<Self> {
        let signer = load_sender_from_env()?;
        Ok(Self {
            rpc: SuiRpcClient::new(rpc_url),
            signer: Some(signer),
        })
    }

    pub fn rpc(&self) -> &SuiRpcClient {
        &self.rpc
    }

    pub fn sender(&self) -> Option<&str> {
        self.signer.as_ref().map(|(addr, _)| addr.as_str())
    }

    /// Build, sign, and execute a Move call.
    ///
    /// Transaction failure is a value on the returned response, never an
    /// `Err`; errors are reserved for transport and signing problems.
    pub async fn execute_move_call(&self, call: MoveCall) -> Result<TxResponse> {
        let Some((sender, key)) = self.signer.as_ref() else {
            warn!(
                "No signer configured; {}::{} not submitted",
                call.module, call.function
            );
            return Ok(TxResponse {
                status: TxStatus::RejectedBySigner,
                created: Vec::new(),
            });
        };

        let gas_budget = call.gas_budget.unwrap_or(FALLBACK_GAS_BUDGET_MIST);
        debug!(
            "Building {}::{}::{} for {}",
            call.package, call.module, call.function, sender
        );

        // The fullnode assembles the transaction; we only sign its bytes.
        let built = self
            .rpc
            .call(
                "unsafe_moveCall",
                json!([
                    sender,
                    call.package,
                    call.module,
                    call.function,
                    call.type_args,
                    call.args,
                    Value::Null,
                    gas_budget.to_string(),
                ]),
            )
            .await?;

        let tx_bytes_b64 = built
            .get("txBytes")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SuiInterfaceError::ParseError("unsafe_moveCall returned no txBytes".to_string())
            })?;

        let signature = sign_transaction_bytes(key, tx_bytes_b64)?;

        let result = self
            .rpc
            .call(
                "sui_executeTransactionBlock",
                json!([
                    tx_bytes_b64,
                    [signature],
                    { "showEffects": true, "showObjectChanges": true },
                    "WaitForLocalExecution",
                ]),
            )
            .await?;

        let status = parse_status(&result);
        if let TxStatus::Failed { reason, digest } = &status {
            warn!(
                "{}::{} transaction failed: {} (tx: {})",
                call.module,
                call.function,
                reason,
                digest.as_deref().unwrap_or("unknown")
            );
        }

        Ok(TxResponse {
            status,
            created: parse_created_objects(&result),
        })
    }
}

/// Produce the serialized Sui signature for base64 transaction bytes:
/// ed25519 over blake2b-256 of (signing intent || tx bytes), encoded as
/// base64(flag || signature || public key).
fn sign_transaction_bytes(key: &SigningKey, tx_bytes_b64: &str) -> Result<String> {
    let tx_bytes = BASE64_STANDARD
        .decode(tx_bytes_b64)
        .map_err(|e| SuiInterfaceError::ParseError(e.to_string()))?;

    let mut hasher = Blake2b256::new();
    hasher.update([0u8, 0u8, 0u8]); // TransactionData signing intent
    hasher.update(&tx_bytes);
    let digest = hasher.finalize();

    let signature = key.sign(digest.as_slice());

    let mut serialized = Vec::with_capacity(1 + 64 + 32);
    serialized.push(0x00); // ed25519 scheme flag
    serialized.extend_from_slice(&signature.to_bytes());
    serialized.extend_from_slice(key.verifying_key().as_bytes());
    Ok(BASE64_STANDARD.encode(serialized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    #[test]
    fn serialized_signature_layout() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let tx_bytes = BASE64_STANDARD.encode(b"fake tx bytes");
        let sig_b64 = sign_transaction_bytes(&key, &tx_bytes).unwrap();
        let raw = BASE64_STANDARD.decode(sig_b64).unwrap();
        assert_eq!(raw.len(), 97);
        assert_eq!(raw[0], 0x00);
        assert_eq!(&raw[65..], key.verifying_key().as_bytes());

        // Signature must verify over the intent-prefixed digest
        let mut hasher = Blake2b256::new();
        hasher.update([0u8, 0u8, 0u8]);
        hasher.update(BASE64_STANDARD.decode(tx_bytes).unwrap());
        let digest = hasher.finalize();
        let signature = ed25519_dalek::Signature::from_slice(&raw[1..65]).unwrap();
        key.verifying_key()
            .verify(digest.as_slice(), &signature)
            .unwrap();
    }

    #[tokio::test]
    async fn missing_signer_rejects_instead_of_erroring() {
        let interface = SuiInterface::new("http://127.0.0.1:1");
        let response = interface
            .execute_move_call(MoveCall {
                package: "0xp".to_string(),
                module: "albums".to_string(),
                function: "publish".to_string(),
                type_args: vec![],
                args: vec![],
                gas_budget: None,
            })
            .await
            .unwrap();
        assert_eq!(response.status, TxStatus::RejectedBySigner);
    }
}
