use alloy_primitives::B256;
use axum::extract::{Path, State};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{ApiResponse, ApiResult};
use crate::services::token_transfers::{ReceiptTransfer, erc20_transfers_in_receipt};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTransfers {
    pub transaction_hash: String,
    pub transfers: Vec<ReceiptTransfer>,
}

/// `0x` followed by exactly 64 hex characters, any case
pub fn parse_tx_hash(input: &str) -> Result<B256, ApiError> {
    let invalid = || ApiError::InvalidTransactionHash(input.to_string());
    let digits = input.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 64 {
        return Err(invalid());
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
    Ok(B256::from(bytes))
}

/// ERC-20 transfers emitted by one transaction, decoded from its receipt
pub async fn get_receipt_transfers(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<ReceiptTransfers> {
    let hash = parse_tx_hash(&tx_hash)?;
    let transfers =
        erc20_transfers_in_receipt(state.ledger.as_ref(), &state.token_metadata, hash).await?;

    Ok(ApiResponse::ok(ReceiptTransfers {
        transaction_hash: format!("0x{}", hex::encode(hash)),
        transfers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_hash() {
        let hash = format!("0x{}", "Ab".repeat(32));
        assert_eq!(parse_tx_hash(&hash).unwrap(), B256::repeat_byte(0xab));

        let unprefixed = "ab".repeat(33);
        let not_hex = format!("0x{}", "zz".repeat(32));
        for bad in ["", "0x12", unprefixed.as_str(), not_hex.as_str()] {
            assert!(
                matches!(parse_tx_hash(bad), Err(ApiError::InvalidTransactionHash(_))),
                "{}",
                bad
            );
        }
    }
}
