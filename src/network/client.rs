// src/network/client.rs
use crate::miner::work::{WorkParams, biguint_from_hex, difficulty_from_target};
use crate::types::{INVALID_VERSION, version_from_marker};
use crate::utils::error::MinerError;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// All-zero placeholder carried as the third submit parameter
const SUBMIT_PLACEHOLDER: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Latest/pending block metadata, used only for status logging
///
/// Not correctness-relevant to the mining loop; a failed or partial
/// fetch only costs a log line.
#[derive(Debug, Clone, Default)]
pub struct BlockInfo {
    /// Block height
    pub number: u64,
    /// Difficulty as reported by the coordinator (decimal)
    pub difficulty: String,
    /// Address credited with the block
    pub miner: String,
    /// Nonce that sealed the block
    pub nonce: String,
    /// Block hash version
    pub version: String,
}

/// JSON-RPC client for one coordinator endpoint (pool or node)
///
/// Work requests and submissions share a monotonically incrementing
/// request id; the id counter is shared between the poll loop's client
/// and the submitter's client via `Arc`.
pub struct CoordinatorClient {
    /// HTTP client, reused across requests for connection pooling
    http: Client,
    /// Coordinator endpoint URL
    url: String,
    /// Shared request id counter
    req_id: Arc<AtomicU64>,
}

impl CoordinatorClient {
    /// Creates a client for the given endpoint
    pub fn new(url: String, req_id: Arc<AtomicU64>) -> Self {
        CoordinatorClient {
            http: Client::new(),
            url,
            req_id,
        }
    }

    /// The endpoint this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the current work parameters
    ///
    /// The response's `result` is a 3-element array:
    /// `[workHashHex, versionMarker, targetHex]`. An unrecognized version
    /// marker makes the work invalid; it is reported as an error here so
    /// the poll loop never publishes it.
    pub async fn get_work(&self) -> Result<WorkParams, MinerError> {
        let response = self.rpc_call("aqua_getWork", Value::Null).await?;
        let result = response["result"]
            .as_array()
            .ok_or_else(|| MinerError::ProtocolError("get-work result is not an array".into()))?;
        if result.len() != 3 {
            return Err(MinerError::ProtocolError(format!(
                "get-work result has {} elements, expected 3",
                result.len()
            )));
        }

        let field = |i: usize, name: &str| -> Result<&str, MinerError> {
            result[i]
                .as_str()
                .ok_or_else(|| MinerError::ProtocolError(format!("{} is not a string", name)))
        };
        let work_hash = field(0, "work hash")?;
        let marker = field(1, "version marker")?;
        let target_hex = field(2, "target")?;

        let version = version_from_marker(marker);
        if version == INVALID_VERSION {
            return Err(MinerError::ProtocolError(format!(
                "unrecognized version marker: {}",
                marker
            )));
        }

        let target = biguint_from_hex(target_hex)?;
        let difficulty = difficulty_from_target(&target);
        Ok(WorkParams {
            version,
            work_hash: work_hash.to_string(),
            target,
            difficulty,
        })
    }

    /// Submits a found nonce for the given work hash
    ///
    /// Returns the accept verdict and the raw response body. Acceptance
    /// means a `result` of JSON `true` or the literal string `"true"`;
    /// anything else is a rejection.
    pub async fn submit_work(
        &self,
        nonce: u64,
        work_hash: &str,
    ) -> Result<(bool, String), MinerError> {
        let params = json!([format!("0x{:016x}", nonce), work_hash, SUBMIT_PLACEHOLDER]);
        let response = self.rpc_call("aqua_submitWork", params).await?;

        let accepted = match &response["result"] {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        };
        Ok((accepted, response.to_string()))
    }

    /// Fetches block metadata for status logging
    ///
    /// # Arguments
    /// * `tag` - Block selector, e.g. `"latest"` or `"pending"`
    pub async fn block_info(&self, tag: &str) -> Result<BlockInfo, MinerError> {
        let response = self
            .rpc_call("aqua_getBlockByNumber", json!([tag, false]))
            .await?;
        let block = response["result"]
            .as_object()
            .ok_or_else(|| MinerError::ProtocolError("missing block object".into()))?;

        let string_of = |name: &str| {
            block
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let number_hex = string_of("number");
        let number = u64::from_str_radix(number_hex.strip_prefix("0x").unwrap_or(&number_hex), 16)
            .unwrap_or(0);
        let difficulty = biguint_from_hex(&string_of("difficulty"))
            .map(|d| d.to_str_radix(10))
            .unwrap_or_default();

        Ok(BlockInfo {
            number,
            difficulty,
            miner: string_of("miner"),
            nonce: string_of("nonce"),
            version: string_of("version"),
        })
    }

    /// Makes a JSON-RPC call to the coordinator
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, MinerError> {
        let id = self.req_id.fetch_add(1, Ordering::SeqCst);
        let response = self
            .http
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params
            }))
            .send()
            .await?
            .json()
            .await?;

        Ok(response)
    }
}
