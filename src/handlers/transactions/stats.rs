use alloy_primitives::Address;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use std::sync::Arc;

use super::{BlockRangeQuery, LimitWarning, direction_counts, is_limit_reached, limit_warning};
use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiResponse, ApiResult};
use crate::services::explorer::{RawTransaction, TxListQuery};
use crate::utils::address::parse_address_any_case;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionStats {
    pub total_transactions: usize,
    pub incoming_count: usize,
    pub outgoing_count: usize,
    pub is_limit_reached: bool,
    pub limit_warning: Option<LimitWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionCount {
    pub total_count: usize,
    pub is_limit_reached: bool,
}

/// Every transaction in range the explorer will return (capped at 10,000)
async fn fetch_all(
    state: &AppState,
    wallet: Address,
    range: &BlockRangeQuery,
) -> Result<Vec<RawTransaction>, ApiError> {
    let transactions = state
        .explorer
        .tx_list(&TxListQuery {
            address: wallet,
            start_block: range.start_block.unwrap_or(0),
            end_block: range.end_block,
            page: None,
        })
        .await?
        .into_transactions();
    Ok(transactions)
}

/// Incoming/outgoing totals over a block range
pub async fn get_transaction_stats(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
    Query(range): Query<BlockRangeQuery>,
) -> ApiResult<TransactionStats> {
    let wallet = parse_address_any_case(&wallet_address)?;
    let transactions = fetch_all(&state, wallet, &range).await?;
    let (incoming_count, outgoing_count) = direction_counts(&transactions, &wallet);

    Ok(ApiResponse::ok(TransactionStats {
        total_transactions: transactions.len(),
        incoming_count,
        outgoing_count,
        is_limit_reached: is_limit_reached(transactions.len()),
        limit_warning: limit_warning(transactions.len()),
    }))
}

/// Number of transactions over a block range
pub async fn get_transaction_count(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
    Query(range): Query<BlockRangeQuery>,
) -> ApiResult<TransactionCount> {
    let wallet = parse_address_any_case(&wallet_address)?;

    // Count requests usually follow a page request for the same wallet
    tokio::time::sleep(state.env_vars.explorer_pacing()).await;

    let transactions = fetch_all(&state, wallet, &range).await?;

    Ok(ApiResponse::ok(TransactionCount {
        total_count: transactions.len(),
        is_limit_reached: is_limit_reached(transactions.len()),
    }))
}
