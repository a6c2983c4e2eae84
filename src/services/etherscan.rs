//! Etherscan API client
//!
//! Wraps the handful of Etherscan endpoints the explorer uses. Metadata
//! lookups go through [`EtherscanClient::fetch_json`], which swallows every
//! failure and returns `None`; the transaction list reports failures as
//! [`ExplorerError`] because its caller has no fallback.

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::explorer::{
    ContractSourceRecord, ExplorerApi, ExplorerError, RawTransaction, TokenInfoRecord,
    TxListOutcome, TxListQuery,
};

/// Default Etherscan (multichain v2) API base URL
const DEFAULT_ETHERSCAN_API_BASE: &str = "https://api.etherscan.io/v2/api";

const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

/// Etherscan API client
pub struct EtherscanClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    chain_id: u64,
    lookup_timeout: Duration,
    tx_list_timeout: Duration,
}

impl EtherscanClient {
    /// Creates a client against the public Etherscan API
    ///
    /// # Arguments
    /// * `http_client` - Shared HTTP client for making requests
    /// * `api_key` - Etherscan API key; without one every call is skipped
    /// * `chain_id` - Chain to query (1 = Ethereum mainnet)
    pub fn new(http_client: Client, api_key: Option<String>, chain_id: u64) -> Self {
        Self::with_base_url(
            http_client,
            api_key,
            chain_id,
            DEFAULT_ETHERSCAN_API_BASE.to_string(),
        )
    }

    /// Creates a client with a custom API base URL
    ///
    /// This is useful for testing with a mock server.
    pub fn with_base_url(
        http_client: Client,
        api_key: Option<String>,
        chain_id: u64,
        base_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            base_url,
            chain_id,
            lookup_timeout: Duration::from_secs(8),
            tx_list_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeouts(mut self, lookup_timeout: Duration, tx_list_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self.tx_list_timeout = tx_list_timeout;
        self
    }

    /// Full request URL for `params`, with chain id and API key appended
    fn url(&self, params: &[(&str, String)]) -> Option<Url> {
        let api_key = self.api_key.as_ref()?;
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("chainid", self.chain_id.to_string()));
        query.push(("apikey", api_key.clone()));

        Url::parse_with_params(&self.base_url, &query)
            .map_err(|e| log::warn!("Invalid Etherscan base URL {}: {}", self.base_url, e))
            .ok()
    }

    /// GET a URL and parse the body as JSON
    ///
    /// Returns `None` on network failure, timeout, non-2xx status or a body
    /// that is not JSON. Never fails.
    pub async fn fetch_json(&self, url: Url, timeout: Duration) -> Option<Value> {
        let response = match self
            .http_client
            .get(url)
            .header("accept", "application/json")
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Etherscan request failed: {}", e.without_url());
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!("Etherscan returned HTTP {}", response.status());
            return None;
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| log::warn!("Etherscan body is not JSON: {}", e.without_url()))
            .ok()
    }

    /// First record of a `status: "1"` envelope
    async fn first_record<T: DeserializeOwned>(&self, params: &[(&str, String)]) -> Option<T> {
        let url = self.url(params)?;
        let body = self.fetch_json(url, self.lookup_timeout).await?;

        if body.get("status").and_then(Value::as_str) != Some("1") {
            log::debug!(
                "Etherscan {:?} answered status {:?}",
                params,
                body.get("message")
            );
            return None;
        }

        let first = body.get("result")?.as_array()?.first()?.clone();
        serde_json::from_value(first)
            .map_err(|e| log::warn!("Unexpected Etherscan record shape: {}", e))
            .ok()
    }
}

#[async_trait]
impl ExplorerApi for EtherscanClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn token_info(&self, address: &Address) -> Option<TokenInfoRecord> {
        self.first_record(&[
            ("module", "token".to_string()),
            ("action", "tokeninfo".to_string()),
            ("contractaddress", address.to_checksum(None)),
        ])
        .await
    }

    async fn contract_source(&self, address: &Address) -> Option<ContractSourceRecord> {
        self.first_record(&[
            ("module", "contract".to_string()),
            ("action", "getsourcecode".to_string()),
            ("address", address.to_checksum(None)),
        ])
        .await
    }

    async fn tx_list(&self, query: &TxListQuery) -> Result<TxListOutcome, ExplorerError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", query.address.to_checksum(None)),
            ("startblock", query.start_block.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(end_block) = query.end_block {
            params.push(("endblock", end_block.to_string()));
        }
        if let Some((page, page_size)) = query.page {
            params.push(("page", page.to_string()));
            params.push(("offset", page_size.to_string()));
        }

        let url = match (&self.api_key, self.url(&params)) {
            (None, _) => return Err(ExplorerError::MissingApiKey),
            (Some(_), None) => {
                return Err(ExplorerError::Transport("invalid base URL".to_string()));
            }
            (Some(_), Some(url)) => url,
        };

        log::info!(
            "Fetching txlist for {} (start {}, end {:?}, page {:?})",
            query.address,
            query.start_block,
            query.end_block,
            query.page
        );

        let response = self
            .http_client
            .get(url)
            .header("accept", "application/json")
            .timeout(self.tx_list_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExplorerError::Timeout
                } else {
                    ExplorerError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Etherscan txlist returned HTTP {}", status);
            return Err(ExplorerError::Http(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ExplorerError::Malformed(e.without_url().to_string()))?;

        if body.get("status").and_then(Value::as_str) == Some("0") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if message == NO_TRANSACTIONS_MESSAGE {
                return Ok(TxListOutcome::NoTransactions);
            }
            // Errors put the detail in `result` ("Invalid API Key", rate limits, ...)
            let detail = body.get("result").and_then(Value::as_str);
            return Err(ExplorerError::Api(match detail {
                Some(detail) if !detail.is_empty() => format!("{} ({})", message, detail),
                _ => message.to_string(),
            }));
        }

        let records = body
            .get("result")
            .cloned()
            .ok_or_else(|| ExplorerError::Malformed("missing result".to_string()))?;
        let transactions: Vec<RawTransaction> = serde_json::from_value(records)
            .map_err(|e| ExplorerError::Malformed(e.to_string()))?;

        Ok(TxListOutcome::Transactions(transactions))
    }
}
