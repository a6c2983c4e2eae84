//! Native balance of an address as of a calendar date

use alloy_primitives::Address;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use super::block_locator::{BlockTimestampLocator, LocatorError};
use super::ledger::LedgerClient;
use crate::utils::format::{format_ether, midnight_utc_timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAtDate {
    /// Ether, shortest exact decimal
    pub balance: String,
    pub block_number: u64,
    /// Timestamp searched for (midnight UTC of `date`)
    pub timestamp: u64,
    pub date: String,
}

/// Balance at the last block at or before midnight UTC of `date`
pub async fn balance_at_date(
    ledger: Arc<dyn LedgerClient>,
    address: Address,
    date: NaiveDate,
) -> Result<BalanceAtDate, LocatorError> {
    // Dates before 1970 sit before genesis anyway
    let timestamp = midnight_utc_timestamp(date).unwrap_or(0);

    let current_block = ledger.block_number().await?;
    let block_number = BlockTimestampLocator::new(ledger.clone())
        .find_block_at_or_before(timestamp, current_block)
        .await?;

    let wei = ledger.balance(address, Some(block_number)).await?;

    log::info!(
        "Balance of {} on {} (block {}): {} wei",
        address,
        date,
        block_number,
        wei
    );

    Ok(BalanceAtDate {
        balance: format_ether(wei),
        block_number,
        timestamp,
        date: date.format("%Y-%m-%d").to_string(),
    })
}
