pub mod classifier;
pub mod live;
pub mod receipt;
pub mod stats;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::EXPLORER_RESULT_CAP;
use crate::services::explorer::RawTransaction;

/// Block range shared by the transaction endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRangeQuery {
    pub start_block: Option<u64>,
    pub end_block: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitWarning {
    pub message: &'static str,
    pub suggestion: &'static str,
}

/// Warning attached when the explorer returned as many records as it ever will
pub fn limit_warning(result_count: usize) -> Option<LimitWarning> {
    is_limit_reached(result_count).then_some(LimitWarning {
        message: "Results limited to 10,000 transactions. There might be more transactions available.",
        suggestion: "Try reducing the block range for more complete results.",
    })
}

pub fn is_limit_reached(result_count: usize) -> bool {
    result_count >= EXPLORER_RESULT_CAP
}

/// `(incoming, outgoing)` counts by address comparison
///
/// A transaction from the wallet to itself counts in both.
pub fn direction_counts(transactions: &[RawTransaction], wallet: &Address) -> (usize, usize) {
    transactions.iter().fold((0, 0), |(incoming, outgoing), tx| {
        (
            incoming + usize::from(tx.to.as_ref() == Some(wallet)),
            outgoing + usize::from(tx.from == *wallet),
        )
    })
}
