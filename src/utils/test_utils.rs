//! In-memory ledger and explorer doubles for unit tests
//!
//! Integration tests under `tests/` cannot see `#[cfg(test)]` items, so they
//! run the real clients against wiremock instead (see `tests/common/mod.rs`).

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::{SolType, sol_data};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::services::explorer::{
    ContractSourceRecord, ExplorerApi, ExplorerError, RawTransaction, TokenInfoRecord,
    TxListOutcome, TxListQuery,
};
use crate::services::ledger::{BlockHeader, LedgerClient, LedgerError, TransactionReceipt};

/// ABI-encoded `string` return value
pub fn abi_string(value: &str) -> Vec<u8> {
    <sol_data::String as SolType>::abi_encode(&value.to_string())
}

/// ABI-encoded `uint256` return value
pub fn abi_uint(value: u64) -> Vec<u8> {
    <sol_data::Uint<256> as SolType>::abi_encode(&U256::from(value))
}

/// Ledger backed by hash maps; unknown calls revert, unknown blocks are missing
#[derive(Default)]
pub struct FakeLedger {
    blocks: Mutex<HashMap<u64, u64>>,
    latest: Mutex<Option<u64>>,
    balances: Mutex<HashMap<(Address, u64), U256>>,
    calls: Mutex<HashMap<(Address, [u8; 4]), Vec<u8>>>,
    receipts: Mutex<HashMap<B256, TransactionReceipt>>,
    call_count: AtomicUsize,
    block_fetches: AtomicUsize,
}

impl FakeLedger {
    pub fn add_block(&self, number: u64, timestamp: u64) {
        self.blocks.lock().unwrap().insert(number, timestamp);
    }

    pub fn set_latest_block(&self, number: u64) {
        *self.latest.lock().unwrap() = Some(number);
    }

    pub fn set_balance(&self, address: Address, block: u64, wei: U256) {
        self.balances.lock().unwrap().insert((address, block), wei);
    }

    pub fn set_call(&self, to: Address, selector: [u8; 4], output: Vec<u8>) {
        self.calls.lock().unwrap().insert((to, selector), output);
    }

    pub fn set_receipt(&self, hash: B256, receipt: TransactionReceipt) {
        self.receipts.lock().unwrap().insert(hash, receipt);
    }

    /// Number of `call` invocations so far
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of `block` invocations so far
    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }

    fn latest(&self) -> u64 {
        self.latest
            .lock()
            .unwrap()
            .or_else(|| self.blocks.lock().unwrap().keys().max().copied())
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        Ok(self.latest())
    }

    async fn block(&self, number: u64) -> Result<BlockHeader, LedgerError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        let timestamp = self
            .blocks
            .lock()
            .unwrap()
            .get(&number)
            .copied()
            .ok_or(LedgerError::BlockNotFound(number))?;
        Ok(BlockHeader {
            number,
            hash: Some(format!("0x{:064x}", number)),
            timestamp,
        })
    }

    async fn balance(&self, address: Address, block: Option<u64>) -> Result<U256, LedgerError> {
        let block = block.unwrap_or_else(|| self.latest());
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(address, block))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, LedgerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let mut selector = [0u8; 4];
        if data.len() >= 4 {
            selector.copy_from_slice(&data[..4]);
        }
        self.calls
            .lock()
            .unwrap()
            .get(&(to, selector))
            .cloned()
            .map(Bytes::from)
            .ok_or_else(|| LedgerError::Rpc {
                code: Some(-32000),
                message: "execution reverted".to_string(),
            })
    }

    async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, LedgerError> {
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }
}

/// Explorer backed by hash maps
#[derive(Default)]
pub struct FakeExplorer {
    configured: bool,
    token_infos: Mutex<HashMap<Address, TokenInfoRecord>>,
    sources: Mutex<HashMap<Address, ContractSourceRecord>>,
    transactions: Mutex<Vec<RawTransaction>>,
    lookups: AtomicUsize,
}

impl FakeExplorer {
    /// Explorer with an API key; `default()` has none
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    pub fn set_token_info(&self, address: Address, record: TokenInfoRecord) {
        self.token_infos.lock().unwrap().insert(address, record);
    }

    pub fn set_contract_source(&self, address: Address, record: ContractSourceRecord) {
        self.sources.lock().unwrap().insert(address, record);
    }

    pub fn set_transactions(&self, transactions: Vec<RawTransaction>) {
        *self.transactions.lock().unwrap() = transactions;
    }

    /// Number of token info / contract source lookups so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplorerApi for FakeExplorer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn token_info(&self, address: &Address) -> Option<TokenInfoRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.token_infos.lock().unwrap().get(address).cloned()
    }

    async fn contract_source(&self, address: &Address) -> Option<ContractSourceRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().get(address).cloned()
    }

    async fn tx_list(&self, query: &TxListQuery) -> Result<TxListOutcome, ExplorerError> {
        if !self.configured {
            return Err(ExplorerError::MissingApiKey);
        }
        let all = self.transactions.lock().unwrap().clone();
        let page: Vec<RawTransaction> = match query.page {
            Some((page, size)) => all
                .into_iter()
                .skip((page.saturating_sub(1) * size) as usize)
                .take(size as usize)
                .collect(),
            None => all,
        };
        if page.is_empty() {
            Ok(TxListOutcome::NoTransactions)
        } else {
            Ok(TxListOutcome::Transactions(page))
        }
    }
}
