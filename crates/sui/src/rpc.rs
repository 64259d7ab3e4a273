use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, SuiInterfaceError};

/// Minimal JSON-RPC transport to a Sui fullnode.
#[derive(Clone)]
pub struct SuiRpcClient {
    url: String,
    client: reqwest::Client,
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!("Sui RPC call: {}", method);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuiInterfaceError::RpcConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SuiInterfaceError::RpcConnectionError(format!(
                "{} returned {}",
                method,
                response.status()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| SuiInterfaceError::ParseError(e.to_string()))?;

        if let Some(err) = envelope.get("error") {
            return Err(SuiInterfaceError::RpcError {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
            });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| SuiInterfaceError::ParseError(format!("{} response has no result", method)))
    }
}
