//! # JSON-RPC Client
//!
//! A thin blocking JSON-RPC 2.0 client for the ledger API. Nothing clever
//! lives here on purpose: it joins the version path onto the endpoint once
//! at construction, posts request bodies, and parses response envelopes.
//! No retries, no backoff, no connection pooling beyond what the HTTP
//! client already does.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{
    API_VERSION_PATH, METHOD_GET_BALANCE, METHOD_GET_BLOCK_BY_HASH, METHOD_GET_BLOCK_BY_HEIGHT,
    METHOD_GET_LAST_BLOCK, METHOD_SEND_TRANSACTION, RPC_TIMEOUT,
};
use crate::crypto::address::Address;
use crate::transaction::builder::SignedTransfer;

/// RPC failures. `Http` is transport-level; `MalformedResponse` means the
/// server answered but the body does not fit the envelope we expect.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc transport failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server's answer was not a usable JSON-RPC response.
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),

    /// The server returned a JSON-RPC level error object.
    #[error("rpc error {code}: {message}")]
    Server { code: i64, message: String },
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// A blocking client bound to one API endpoint.
pub struct RpcClient {
    http: reqwest::blocking::Client,
    url: String,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").field("url", &self.url).finish()
    }
}

impl RpcClient {
    /// Build a client for `endpoint`, appending the API version path once.
    pub fn new(endpoint: &str) -> Result<Self, RpcError> {
        let base = endpoint.trim_end_matches('/');
        let url = format!("{base}/{API_VERSION_PATH}");
        let http = reqwest::blocking::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()?;
        Ok(RpcClient {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    /// The fully resolved URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            id,
            params,
        };

        debug!(method, id, url = %self.url, "rpc request");
        let body: Value = self
            .http
            .post(&self.url)
            .json(&request)
            .send()?
            .json()
            .map_err(|e| RpcError::MalformedResponse(e.to_string()))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(RpcError::Server { code, message });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| RpcError::MalformedResponse("missing result".to_string()))
    }

    /// Submit a signed transfer. Returns the raw result object; the
    /// caller already knows the transaction hash from signing.
    pub fn send_transaction(&self, transfer: &SignedTransfer) -> Result<Value, RpcError> {
        self.call(METHOD_SEND_TRANSACTION, Some(transfer.to_json()))
    }

    /// The balance of `address` in loop.
    pub fn get_balance(&self, address: &Address) -> Result<u128, RpcError> {
        let result = self.call(
            METHOD_GET_BALANCE,
            Some(serde_json::json!({ "address": address.to_string() })),
        )?;
        let text = result
            .get("response")
            .and_then(Value::as_str)
            .or_else(|| result.as_str())
            .ok_or_else(|| RpcError::MalformedResponse("missing balance".to_string()))?;
        parse_hex_quantity(text)
            .ok_or_else(|| RpcError::MalformedResponse(format!("bad balance: {text:?}")))
    }

    /// The most recently produced block.
    pub fn get_last_block(&self) -> Result<Value, RpcError> {
        self.call(METHOD_GET_LAST_BLOCK, None)
    }

    /// A block by its hash, in lowercase hex without a prefix.
    pub fn get_block_by_hash(&self, hash: &str) -> Result<Value, RpcError> {
        self.call(
            METHOD_GET_BLOCK_BY_HASH,
            Some(serde_json::json!({ "hash": hash })),
        )
    }

    /// A block by height.
    pub fn get_block_by_height(&self, height: u64) -> Result<Value, RpcError> {
        self.call(
            METHOD_GET_BLOCK_BY_HEIGHT,
            Some(serde_json::json!({ "height": height })),
        )
    }
}

/// Parse a `0x`-prefixed (or bare) hex quantity into loop.
fn parse_hex_quantity(text: &str) -> Option<u128> {
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    u128::from_str_radix(stripped, 16).ok()
}
