use std::env;

use base64::prelude::*;
use bech32::FromBase32;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::SigningKey;
use tracing::debug;

use crate::error::{Result, SuiInterfaceError};

type Blake2b256 = Blake2b<U32>;

/// Resolve the RPC URL based on the following priority:
/// 1. If rpc_url is provided explicitly, use it
/// 2. If SUI_RPC_URL env var is set, use it
/// 3. Otherwise determine the chain (override, then SUI_CHAIN, then devnet),
///    check SUI_RPC_URL_<CHAIN>, and fall back to the public fullnode URL
pub fn resolve_rpc_url(rpc_url: Option<String>, chain_override: Option<String>) -> Result<String> {
    if let Some(url) = rpc_url {
        return Ok(url);
    }

    if let Ok(custom_url) = env::var("SUI_RPC_URL") {
        return Ok(custom_url);
    }

    let chain = chain_override
        .unwrap_or_else(|| env::var("SUI_CHAIN").unwrap_or_else(|_| "devnet".to_string()))
        .to_lowercase();

    match chain.as_str() {
        "devnet" | "testnet" | "mainnet" => {}
        _ => {
            return Err(SuiInterfaceError::RpcConnectionError(format!(
                "Invalid chain '{}'. Must be one of: devnet, testnet, mainnet",
                chain
            )));
        }
    }

    let chain_specific_var = format!("SUI_RPC_URL_{}", chain.to_uppercase());
    if let Ok(chain_url) = env::var(&chain_specific_var) {
        return Ok(chain_url);
    }

    Ok(format!("https://fullnode.{}.sui.io:443", chain))
}

/// Derive the Sui address for a 32-byte ed25519 secret key:
/// blake2b-256 over (scheme flag || public key).
pub fn derive_address_from_secret_key(secret_key_bytes: &[u8; 32]) -> String {
    let signing_key = SigningKey::from_bytes(secret_key_bytes);
    let verifying_key = signing_key.verifying_key();

    let mut hasher = Blake2b256::new();
    hasher.update([0x00u8]); // ed25519 scheme flag
    hasher.update(verifying_key.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Load the sender address and signing key from the environment.
///
/// `SUI_SECRET_KEY` accepts bech32 (`suiprivkey...`), base64, or hex key
/// material; the address derived from the key must match `SUI_ADDRESS`.
pub fn load_sender_from_env() -> Result<(String, SigningKey)> {
    let raw = env::var("SUI_SECRET_KEY")
        .map_err(|_| SuiInterfaceError::KeyError("SUI_SECRET_KEY not set".to_string()))?;
    let key_part = raw
        .split_once(':')
        .map(|(_, b)| b.to_string())
        .unwrap_or(raw);

    let secret = decode_secret_key(&key_part)?;
    let derived_address = derive_address_from_secret_key(&secret);

    let env_addr = env::var("SUI_ADDRESS")
        .map_err(|_| SuiInterfaceError::KeyError("SUI_ADDRESS not set".to_string()))?
        .to_lowercase();
    if env_addr != derived_address {
        return Err(SuiInterfaceError::KeyError(
            "Address mismatch: SUI_ADDRESS does not match address derived from SUI_SECRET_KEY"
                .to_string(),
        ));
    }

    Ok((derived_address, SigningKey::from_bytes(&secret)))
}

fn decode_secret_key(key_part: &str) -> Result<[u8; 32]> {
    // Try bech32 "suiprivkey" first
    if key_part.starts_with("suiprivkey") {
        debug!("Decoding SUI_SECRET_KEY as bech32 suiprivkey");
        let (hrp, data, _variant) = bech32::decode(key_part)
            .map_err(|e| SuiInterfaceError::KeyError(e.to_string()))?;
        if hrp != "suiprivkey" {
            return Err(SuiInterfaceError::KeyError("invalid bech32 hrp".to_string()));
        }
        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| SuiInterfaceError::KeyError(e.to_string()))?;
        if bytes.len() != 33 {
            return Err(SuiInterfaceError::KeyError(
                "bech32 payload must be 33 bytes (flag || key)".to_string(),
            ));
        }
        if bytes[0] != 0x00 {
            return Err(SuiInterfaceError::KeyError(
                "unsupported key scheme flag; only ed25519 supported".to_string(),
            ));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes[1..]);
        return Ok(arr);
    }

    // Else try base64 then hex
    let mut bytes = match BASE64_STANDARD.decode(key_part) {
        Ok(v) => v,
        Err(_) => {
            debug!("SUI_SECRET_KEY not base64; trying hex");
            let hex_str = key_part.strip_prefix("0x").unwrap_or(key_part);
            hex::decode(hex_str).map_err(|e| SuiInterfaceError::KeyError(e.to_string()))?
        }
    };

    // Strip a leading scheme flag when present
    if bytes.len() == 33 && bytes[0] == 0x00 {
        bytes = bytes[1..].to_vec();
    }

    if bytes.len() < 32 {
        return Err(SuiInterfaceError::KeyError(
            "SUI_SECRET_KEY must contain at least 32 bytes".to_string(),
        ));
    }

    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes[..32]);
    Ok(arr)
}
