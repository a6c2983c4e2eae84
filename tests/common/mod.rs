#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ethx_be::AppState;
use ethx_be::services::{EtherscanClient, JsonRpcLedgerClient};
use ethx_be::utils::env::EnvVars;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{MockServer, Request as MockRequest, Respond, ResponseTemplate};

static INIT: Once = Once::new();

/// Load test environment variables and logging. Safe to call multiple times.
///
/// NOTE: Keep in sync with `src/utils/test_utils.rs`, which serves unit tests.
/// Integration tests can't access #[cfg(test)] items from the library.
pub fn load_test_env() {
    INIT.call_once(|| {
        dotenvy::from_filename(".env.test").ok();
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Configuration pointing both upstreams at mock servers, with pacing disabled
pub fn test_env_vars(rpc_url: String, explorer_url: String, api_key: Option<&str>) -> EnvVars {
    EnvVars {
        ethereum_network: "mainnet".to_string(),
        ethereum_rpc_url: rpc_url,
        chain_id: 1,
        etherscan_api_key: api_key.map(str::to_string),
        etherscan_api_base_url: explorer_url,
        port: 0,
        rpc_timeout_seconds: 2,
        explorer_timeout_seconds: 2,
        tx_list_timeout_seconds: 2,
        metadata_pacing_ms: 0,
        explorer_pacing_ms: 0,
        token_metadata_ttl_seconds: None,
        cors_allowed_origins: vec![],
    }
}

/// Router wired to the real clients, talking to `rpc` and `explorer`
pub fn test_app(rpc: &MockServer, explorer: &MockServer, api_key: Option<&str>) -> Router {
    load_test_env();

    let env_vars = test_env_vars(rpc.uri(), format!("{}/v2/api", explorer.uri()), api_key);
    let http_client = reqwest::Client::new();
    let ledger = Arc::new(JsonRpcLedgerClient::new(
        http_client.clone(),
        env_vars.ethereum_rpc_url.clone(),
        Duration::from_secs(2),
    ));
    let explorer = Arc::new(
        EtherscanClient::with_base_url(
            http_client.clone(),
            env_vars.etherscan_api_key.clone(),
            env_vars.chain_id,
            env_vars.etherscan_api_base_url.clone(),
        )
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2)),
    );

    let state = AppState::from_parts(env_vars, ledger, explorer);
    ethx_be::routes::create_routes(Arc::new(state))
}

/// GET `uri` and return the status with the parsed JSON body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// ABI-encoded `string` return value as `0x` hex
pub fn abi_string_hex(value: &str) -> String {
    let mut data = hex::encode(value.as_bytes());
    let padded = data.len().div_ceil(64).max(1) * 64;
    data.push_str(&"0".repeat(padded - data.len()));
    format!("0x{:064x}{:064x}{}", 32, value.len(), data)
}

/// ABI-encoded `uint256` return value as `0x` hex
pub fn abi_uint_hex(value: u64) -> String {
    format!("0x{:064x}", value)
}

/// Left-padded 32-byte word holding `address` (given as `0x` hex)
pub fn address_word(address: &str) -> String {
    format!("{:0>64}", address.trim_start_matches("0x").to_lowercase())
}

/// A fake Ethereum node answering JSON-RPC from memory
///
/// Blocks `0..=latest` exist, `block_time` seconds apart starting at
/// `genesis_timestamp`. `eth_call` answers come from `calls`, keyed by
/// `(lowercase contract, data)`; anything else reverts.
#[derive(Clone, Default)]
pub struct FakeNode {
    pub latest: u64,
    pub genesis_timestamp: u64,
    pub block_time: u64,
    /// Block tag (`"0x32"`, `"latest"`) -> balance in wei as `0x` hex
    pub balances: HashMap<String, String>,
    pub calls: HashMap<(String, String), String>,
    /// Lowercase transaction hash -> receipt JSON
    pub receipts: HashMap<String, Value>,
}

impl FakeNode {
    fn result(&self, method: &str, params: &[Value]) -> Result<Value, Value> {
        match method {
            "eth_blockNumber" => Ok(json!(format!("0x{:x}", self.latest))),
            "eth_getBlockByNumber" => {
                let tag = params.first().and_then(Value::as_str).unwrap_or_default();
                let number = u64::from_str_radix(tag.trim_start_matches("0x"), 16)
                    .map_err(|_| json!({ "code": -32602, "message": "invalid block" }))?;
                if number > self.latest {
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "number": format!("0x{:x}", number),
                    "hash": format!("0x{:064x}", number),
                    "timestamp": format!("0x{:x}", self.genesis_timestamp + number * self.block_time),
                }))
            }
            "eth_getBalance" => {
                let tag = params.get(1).and_then(Value::as_str).unwrap_or("latest");
                Ok(json!(
                    self.balances
                        .get(tag)
                        .cloned()
                        .unwrap_or_else(|| "0x0".to_string())
                ))
            }
            "eth_call" => {
                let call = params.first().cloned().unwrap_or_default();
                let to = call["to"].as_str().unwrap_or_default().to_lowercase();
                let data = call["data"].as_str().unwrap_or_default().to_lowercase();
                self.calls
                    .get(&(to, data))
                    .map(|output| json!(output))
                    .ok_or_else(|| json!({ "code": -32000, "message": "execution reverted" }))
            }
            "eth_getTransactionReceipt" => {
                let hash = params
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_lowercase();
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(json!({ "code": -32601, "message": format!("{} not supported", other) })),
        }
    }
}

impl Respond for FakeNode {
    fn respond(&self, request: &MockRequest) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let id = body["id"].clone();
        let method = body["method"].as_str().unwrap_or_default();
        let params = body["params"].as_array().cloned().unwrap_or_default();

        let payload = match self.result(method, &params) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
        };
        ResponseTemplate::new(200).set_body_json(payload)
    }
}

/// One explorer `txlist` record
pub fn explorer_tx(hash: &str, from: &str, to: &str, value_wei: &str, input: &str) -> Value {
    json!({
        "blockNumber": "19000000",
        "blockHash": "0xfeed",
        "timeStamp": "1704067200",
        "hash": hash,
        "from": from,
        "to": to,
        "value": value_wei,
        "gas": "65000",
        "gasPrice": "30000000000",
        "gasUsed": "46109",
        "isError": "0",
        "input": input,
        "transactionIndex": "3",
        "confirmations": "1000"
    })
}
