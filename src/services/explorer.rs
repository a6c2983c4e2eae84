//! Block-explorer interface
//!
//! This module defines what the service needs from a block explorer.
//! [`EtherscanClient`](super::etherscan::EtherscanClient) is the production
//! implementation.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Display;

use crate::utils::address::parse_address_any_case;
use crate::utils::serde::{empty_as_none, flag, from_str};

/// One `txlist` record as the explorer reports it (every field is a string)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub hash: String,
    #[serde(deserialize_with = "from_str")]
    pub from: Address,
    /// `None` for contract creation
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<Address>,
    #[serde(rename = "value", deserialize_with = "from_str")]
    pub value_wei: U256,
    #[serde(rename = "input", default)]
    pub input_data: String,
    #[serde(deserialize_with = "from_str")]
    pub block_number: u64,
    #[serde(default)]
    pub block_hash: String,
    #[serde(rename = "timeStamp", deserialize_with = "from_str")]
    pub timestamp: u64,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub gas_used: String,
    #[serde(default)]
    pub gas_price: String,
    #[serde(deserialize_with = "from_str")]
    pub transaction_index: u64,
    #[serde(default, deserialize_with = "flag")]
    pub is_error: bool,
}

/// `module=token&action=tokeninfo` record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfoRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "tokenName", default)]
    pub token_name: Option<String>,
}

/// `module=contract&action=getsourcecode` record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractSourceRecord {
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "TokenName", default)]
    pub token_name: Option<String>,
    #[serde(rename = "ContractName", default)]
    pub contract_name: Option<String>,
    #[serde(rename = "Proxy", default)]
    pub proxy: Option<String>,
    #[serde(rename = "Implementation", default)]
    pub implementation: Option<String>,
}

impl ContractSourceRecord {
    /// Implementation address, when the explorer flags the contract as a proxy
    /// and declares a well-formed implementation
    pub fn implementation_address(&self) -> Option<Address> {
        if self.proxy.as_deref() != Some("1") {
            return None;
        }
        parse_address_any_case(self.implementation.as_deref()?).ok()
    }
}

/// Parameters of a `txlist` query
#[derive(Debug, Clone)]
pub struct TxListQuery {
    pub address: Address,
    pub start_block: u64,
    pub end_block: Option<u64>,
    /// `(page, page_size)`; `None` asks for everything the explorer will return
    pub page: Option<(u32, u32)>,
}

#[derive(Debug)]
pub enum TxListOutcome {
    Transactions(Vec<RawTransaction>),
    /// The explorer's "No transactions found" answer
    NoTransactions,
}

impl TxListOutcome {
    pub fn into_transactions(self) -> Vec<RawTransaction> {
        match self {
            TxListOutcome::Transactions(txs) => txs,
            TxListOutcome::NoTransactions => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum ExplorerError {
    MissingApiKey,
    Timeout,
    Http(u16),
    /// `status: "0"` with a message other than "No transactions found"
    Api(String),
    Transport(String),
    Malformed(String),
}

impl Display for ExplorerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExplorerError::MissingApiKey => write!(
                f,
                "Etherscan API key not configured. Please set ETHERSCAN_API_KEY in your .env file."
            ),
            ExplorerError::Timeout => write!(
                f,
                "Request timeout - Etherscan API took too long to respond"
            ),
            ExplorerError::Http(status) => write!(f, "Etherscan API error: HTTP {}", status),
            ExplorerError::Api(msg) => write!(f, "Etherscan API error: {}", msg),
            ExplorerError::Transport(msg) => write!(
                f,
                "Network error - Unable to connect to Etherscan API: {}",
                msg
            ),
            ExplorerError::Malformed(msg) => write!(f, "Malformed Etherscan response: {}", msg),
        }
    }
}

impl std::error::Error for ExplorerError {}

/// Block-explorer operations
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Whether credentials are present; lookups are skipped when they are not
    fn is_configured(&self) -> bool;

    /// Token info for a contract. `None` on any failure, never an error
    async fn token_info(&self, address: &Address) -> Option<TokenInfoRecord>;

    /// Verified-source metadata for a contract. `None` on any failure
    async fn contract_source(&self, address: &Address) -> Option<ContractSourceRecord>;

    /// Normal transactions touching an address, newest first
    async fn tx_list(&self, query: &TxListQuery) -> Result<TxListOutcome, ExplorerError>;
}
