use alloy_primitives::Address;
use axum::extract::{Path, Query, State};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::classifier::{Direction, classify};
use super::{LimitWarning, direction_counts, is_limit_reached, limit_warning};
use crate::AppState;
use crate::constants::{EXPLORER_RESULT_CAP, NATIVE_DECIMALS};
use crate::handlers::{ApiResponse, ApiResult};
use crate::services::explorer::{RawTransaction, TxListQuery};
use crate::services::token_metadata::TokenMetadata;
use crate::utils::address::{checksummed, parse_address_any_case};
use crate::utils::format::{DISPLAY_FRACTION_DIGITS, format_units_fixed, iso_date_from_unix};

const DEFAULT_PAGE_SIZE: u32 = 30;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTransactionsQuery {
    pub start_block: Option<u64>,
    pub end_block: Option<u64>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// One annotated transaction as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub transaction_hash: String,
    pub from_address: String,
    pub to_address: Option<String>,
    /// Ether, six fraction digits
    pub value: String,
    /// Token amount scaled by the token's decimals, six fraction digits
    pub token_amount: Option<String>,
    pub token_amount_raw: Option<String>,
    pub token_symbol: Option<String>,
    pub token_name: Option<String>,
    pub token_decimals: Option<u8>,
    pub token_contract: Option<String>,
    pub token_type: Option<&'static str>,
    pub transaction_type: &'static str,
    pub gas_price: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub block_number: u64,
    pub block_hash: String,
    pub timestamp: u64,
    pub date: Option<String>,
    pub transaction_index: u64,
    /// 1 = success, 0 = reverted
    pub status: u8,
    #[serde(rename = "type")]
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageStats {
    /// Unknown without fetching every page
    pub total_transactions: Option<usize>,
    pub incoming_count: usize,
    pub outgoing_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_transactions: Option<usize>,
    pub total_pages: Option<u32>,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    fn new(page: u32, page_size: u32, result_count: usize) -> Self {
        let is_last_page = result_count < page_size as usize;
        Self {
            current_page: page,
            page_size,
            total_transactions: None,
            total_pages: None,
            has_next_page: !is_last_page && !is_limit_reached(result_count),
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveTransactionsPage {
    pub transactions: Vec<TransactionView>,
    pub stats: PageStats,
    pub pagination: Pagination,
    pub warning: Option<LimitWarning>,
}

fn transaction_view(
    tx: &RawTransaction,
    wallet: &Address,
    tokens: &HashMap<Address, TokenMetadata>,
) -> TransactionView {
    let classified = classify(tx, wallet);
    let movement = classified.token_movement();
    let metadata = movement.and_then(|movement| tokens.get(&movement.contract));

    TransactionView {
        transaction_hash: tx.hash.clone(),
        from_address: checksummed(&tx.from),
        to_address: tx.to.as_ref().map(checksummed),
        value: format_units_fixed(tx.value_wei, NATIVE_DECIMALS, DISPLAY_FRACTION_DIGITS),
        token_amount: movement.zip(metadata).map(|(movement, metadata)| {
            format_units_fixed(
                movement.amount_raw,
                metadata.decimals,
                DISPLAY_FRACTION_DIGITS,
            )
        }),
        token_amount_raw: movement.map(|movement| movement.amount_raw.to_string()),
        token_symbol: metadata.map(|metadata| metadata.symbol.clone()),
        token_name: metadata.and_then(|metadata| metadata.name.clone()),
        token_decimals: metadata.map(|metadata| metadata.decimals),
        token_contract: movement.map(|movement| checksummed(&movement.contract)),
        token_type: movement.map(|_| "ERC-20"),
        transaction_type: classified.kind().label(),
        gas_price: tx.gas_price.clone(),
        gas_limit: tx.gas.clone(),
        gas_used: tx.gas_used.clone(),
        block_number: tx.block_number,
        block_hash: tx.block_hash.clone(),
        timestamp: tx.timestamp,
        date: iso_date_from_unix(tx.timestamp),
        transaction_index: tx.transaction_index,
        status: if tx.is_error { 0 } else { 1 },
        direction: classified.direction(),
    }
}

/// Metadata for every distinct token contract moved by `transactions`
async fn resolve_tokens(
    state: &AppState,
    transactions: &[RawTransaction],
    wallet: &Address,
) -> HashMap<Address, TokenMetadata> {
    let mut contracts: Vec<Address> = transactions
        .iter()
        .filter_map(|tx| classify(tx, wallet).token_contract())
        .collect();
    contracts.sort();
    contracts.dedup();

    if !contracts.is_empty() {
        log::debug!("Resolving metadata for {} token contracts", contracts.len());
    }

    let resolved = join_all(
        contracts
            .iter()
            .map(|contract| state.token_metadata.resolve_address(*contract)),
    )
    .await;

    contracts.into_iter().zip(resolved).collect()
}

/// One page of a wallet's transactions, classified and annotated
pub async fn get_live_transactions(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
    Query(params): Query<LiveTransactionsQuery>,
) -> ApiResult<LiveTransactionsPage> {
    let wallet = parse_address_any_case(&wallet_address)?;
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, EXPLORER_RESULT_CAP as u32);

    let transactions = state
        .explorer
        .tx_list(&TxListQuery {
            address: wallet,
            start_block: params.start_block.unwrap_or(0),
            end_block: params.end_block,
            page: Some((page, page_size)),
        })
        .await?
        .into_transactions();

    let tokens = resolve_tokens(&state, &transactions, &wallet).await;
    let views: Vec<TransactionView> = transactions
        .iter()
        .map(|tx| transaction_view(tx, &wallet, &tokens))
        .collect();

    let (incoming_count, outgoing_count) = direction_counts(&transactions, &wallet);

    log::info!(
        "Page {} for {}: {} transactions, {} token contracts",
        page,
        wallet,
        views.len(),
        tokens.len()
    );

    Ok(ApiResponse::ok(LiveTransactionsPage {
        pagination: Pagination::new(page, page_size, views.len()),
        warning: limit_warning(views.len()),
        stats: PageStats {
            total_transactions: None,
            incoming_count,
            outgoing_count,
        },
        transactions: views,
    }))
}
