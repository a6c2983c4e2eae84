//! ERC-20 `Transfer` events recovered from a transaction receipt

use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use serde::Serialize;

use super::ledger::{LedgerClient, LedgerError, ReceiptLog};
use super::token_metadata::TokenMetadataResolver;
use crate::constants::abi::IERC20;
use crate::utils::address::checksummed;
use crate::utils::format::{DISPLAY_FRACTION_DIGITS, format_units_fixed};

/// One token movement emitted by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptTransfer {
    pub token_contract: String,
    pub token_symbol: String,
    pub token_decimals: u8,
    /// Scaled by the token's decimals, six fraction digits
    pub token_amount: String,
    pub token_amount_raw: String,
    pub from: String,
    pub to: String,
}

/// `log` as an ERC-20 `Transfer`
///
/// ERC-721 shares the event signature but indexes the token id as a fourth
/// topic, so it is rejected here.
pub fn decode_transfer_log(log: &ReceiptLog) -> Option<IERC20::Transfer> {
    if log.topics.len() != 3 || log.topics[0] != IERC20::Transfer::SIGNATURE_HASH {
        return None;
    }
    IERC20::Transfer::decode_raw_log(log.topics.iter().copied(), &log.data).ok()
}

/// Every ERC-20 transfer in the receipt of `tx_hash`, in log order
///
/// An unknown or pending hash yields no transfers.
pub async fn erc20_transfers_in_receipt(
    ledger: &dyn LedgerClient,
    resolver: &TokenMetadataResolver,
    tx_hash: B256,
) -> Result<Vec<ReceiptTransfer>, LedgerError> {
    let receipt = match ledger.receipt(tx_hash).await? {
        Some(receipt) => receipt,
        None => {
            log::debug!("No receipt for {}", tx_hash);
            return Ok(Vec::new());
        }
    };

    let mut transfers = Vec::new();
    for entry in &receipt.logs {
        let event = match decode_transfer_log(entry) {
            Some(event) => event,
            None => continue,
        };
        let metadata = resolver.resolve_address(entry.address).await;
        transfers.push(ReceiptTransfer {
            token_contract: checksummed(&entry.address),
            token_amount: format_units_fixed(
                event.value,
                metadata.decimals,
                DISPLAY_FRACTION_DIGITS,
            ),
            token_amount_raw: event.value.to_string(),
            token_symbol: metadata.symbol,
            token_decimals: metadata.decimals,
            from: checksummed(&event.from),
            to: checksummed(&event.to),
        });
    }

    log::debug!(
        "{} of {} logs in {} are ERC-20 transfers",
        transfers.len(),
        receipt.logs.len(),
        tx_hash
    );
    Ok(transfers)
}
