//! Ledger access over Ethereum JSON-RPC
//!
//! [`LedgerClient`] is the seam the rest of the service talks to; the
//! [`JsonRpcLedgerClient`] implementation speaks JSON-RPC 2.0 over HTTP.

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::utils::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// Subset of a block header the service needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: Option<String>,
    /// Unix seconds
    pub timestamp: u64,
}

/// One event log emitted by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiptLog {
    /// Emitting contract
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionReceipt {
    pub logs: Vec<ReceiptLog>,
}

#[derive(Debug)]
pub enum LedgerError {
    Transport(String),
    Timeout(Duration),
    Rpc { code: Option<i64>, message: String },
    MalformedResponse(String),
    BlockNotFound(u64),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Transport(msg) => write!(f, "Ledger transport error: {}", msg),
            LedgerError::Timeout(after) => write!(f, "Ledger call timed out after {:?}", after),
            LedgerError::Rpc { code, message } => match code {
                Some(code) => write!(f, "Ledger RPC error {}: {}", code, message),
                None => write!(f, "Ledger RPC error: {}", message),
            },
            LedgerError::MalformedResponse(msg) => write!(f, "Malformed ledger response: {}", msg),
            LedgerError::BlockNotFound(number) => write!(f, "Block {} not found", number),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Read-only ledger operations
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Latest block number
    async fn block_number(&self) -> Result<u64, LedgerError>;

    /// Header of block `number`
    async fn block(&self, number: u64) -> Result<BlockHeader, LedgerError>;

    /// Native balance in wei, at `block` or the latest block
    async fn balance(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError>;

    /// Read-only contract call returning the raw ABI-encoded output
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, LedgerError>;

    /// Receipt of a mined transaction; `None` for unknown or pending hashes
    async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, LedgerError>;
}

fn block_tag(block: Option<u64>) -> String {
    match block {
        Some(number) => format!("0x{:x}", number),
        None => "latest".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: U64,
    hash: Option<String>,
    timestamp: U64,
}

/// JSON-RPC 2.0 ledger client
pub struct JsonRpcLedgerClient {
    http_client: Client,
    rpc_url: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    /// # Arguments
    /// * `http_client` - Shared HTTP client
    /// * `rpc_url` - Node endpoint (Infura, Alchemy, a local node, ...)
    /// * `timeout` - Upper bound for every request
    pub fn new(http_client: Client, rpc_url: String, timeout: Duration) -> Self {
        Self {
            http_client,
            rpc_url,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Send one request; `Ok(None)` means the node answered `result: null`
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        log::debug!("JSON-RPC {} (id {})", method, id);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let body: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        if let Some(error) = body.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result)
    }

    fn transport_error(&self, e: reqwest::Error) -> LedgerError {
        if e.is_timeout() {
            LedgerError::Timeout(self.timeout)
        } else if e.is_decode() {
            LedgerError::MalformedResponse(e.to_string())
        } else {
            LedgerError::Transport(e.to_string())
        }
    }

    fn missing(method: &str) -> LedgerError {
        LedgerError::MalformedResponse(format!("{} returned no result", method))
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        let number: U64 = self
            .request("eth_blockNumber", vec![])
            .await?
            .ok_or_else(|| Self::missing("eth_blockNumber"))?;
        Ok(number.to::<u64>())
    }

    async fn block(&self, number: u64) -> Result<BlockHeader, LedgerError> {
        let block: RpcBlock = self
            .request(
                "eth_getBlockByNumber",
                vec![json!(block_tag(Some(number))), json!(false)],
            )
            .await?
            .ok_or(LedgerError::BlockNotFound(number))?;

        Ok(BlockHeader {
            number: block.number.to::<u64>(),
            hash: block.hash,
            timestamp: block.timestamp.to::<u64>(),
        })
    }

    async fn balance(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError> {
        self.request(
            "eth_getBalance",
            vec![json!(address.to_checksum(None)), json!(block_tag(block))],
        )
        .await?
        .ok_or_else(|| Self::missing("eth_getBalance"))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, LedgerError> {
        self.request(
            "eth_call",
            vec![
                json!({ "to": to.to_checksum(None), "data": data }),
                json!("latest"),
            ],
        )
        .await?
        .ok_or_else(|| Self::missing("eth_call"))
    }

    async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, LedgerError> {
        self.request("eth_getTransactionReceipt", vec![json!(hash)]).await
    }
}
