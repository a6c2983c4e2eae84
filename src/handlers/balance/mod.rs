use axum::extract::{Path, State};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiResponse, ApiResult};
use crate::services::balance::{BalanceAtDate, balance_at_date};
use crate::utils::address::{checksummed, parse_address_any_case};
use crate::utils::format::{format_ether, parse_calendar_date};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBalance {
    pub address: String,
    /// Ether, shortest exact decimal
    pub balance: String,
    pub block_number: u64,
    pub unit: &'static str,
}

/// Native balance at the latest block
pub async fn get_current_balance(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> ApiResult<CurrentBalance> {
    let wallet = parse_address_any_case(&wallet_address)?;

    let (wei, block_number) = tokio::try_join!(
        state.ledger.balance(wallet, None),
        state.ledger.block_number()
    )?;

    Ok(ApiResponse::ok(CurrentBalance {
        address: checksummed(&wallet),
        balance: format_ether(wei),
        block_number,
        unit: "ETH",
    }))
}

/// Native balance as of midnight UTC on `date` (`YYYY-MM-DD`)
pub async fn get_balance_at_date(
    State(state): State<Arc<AppState>>,
    Path((wallet_address, date)): Path<(String, String)>,
) -> ApiResult<BalanceAtDate> {
    let wallet = parse_address_any_case(&wallet_address)?;
    let date = parse_calendar_date(&date).ok_or(ApiError::InvalidDate(date))?;

    let balance = balance_at_date(state.ledger.clone(), wallet, date).await?;

    Ok(ApiResponse::ok(balance))
}
