//! Calendar time to block number
//!
//! Binary search over block timestamps for the highest block whose timestamp
//! does not exceed a target.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use super::ledger::{LedgerClient, LedgerError};
use crate::utils::format::iso_date_from_unix;

#[derive(Debug)]
pub enum LocatorError {
    /// Target lies after the newest block
    FutureDate { target: u64, latest: u64 },
    Ledger(LedgerError),
}

impl Display for LocatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorError::FutureDate { target, latest } => write!(
                f,
                "Date is in the future. Target timestamp {} is after the latest block timestamp {} ({})",
                target,
                latest,
                iso_date_from_unix(*latest).unwrap_or_default()
            ),
            LocatorError::Ledger(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LocatorError {}

impl From<LedgerError> for LocatorError {
    fn from(e: LedgerError) -> Self {
        LocatorError::Ledger(e)
    }
}

pub struct BlockTimestampLocator {
    ledger: Arc<dyn LedgerClient>,
}

impl BlockTimestampLocator {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Highest block in `[0, current_block]` whose timestamp is `<= target`
    ///
    /// # Arguments
    /// * `target` - Unix seconds
    /// * `current_block` - Upper bound of the search, normally the latest block
    ///
    /// # Returns
    /// * `Ok(u64)` - The block number; `0` when even genesis is later than the target
    /// * `Err(LocatorError::FutureDate)` - The target is after `current_block`
    pub async fn find_block_at_or_before(
        &self,
        target: u64,
        current_block: u64,
    ) -> Result<u64, LocatorError> {
        // Block timestamps fetched during this search
        let mut timestamps: HashMap<u64, u64> = HashMap::new();

        let latest = self.timestamp_of(current_block, &mut timestamps).await?;
        if target > latest {
            return Err(LocatorError::FutureDate { target, latest });
        }

        log::info!(
            "Binary searching for block at or before timestamp {} in range [0, {}]",
            target,
            current_block
        );

        let mut low = 0u64;
        let mut high = current_block;
        let mut best = 0u64;

        while low <= high {
            let mid = low + (high - low) / 2;
            let mid_timestamp = self.timestamp_of(mid, &mut timestamps).await?;

            log::debug!(
                "Checking block {} with timestamp {} (target: {})",
                mid,
                mid_timestamp,
                target
            );

            if mid_timestamp <= target {
                best = mid;
                low = mid + 1;
            } else {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            }
        }

        log::info!(
            "Binary search completed. Block {} for timestamp {} ({} blocks fetched)",
            best,
            target,
            timestamps.len()
        );

        Ok(best)
    }

    async fn timestamp_of(
        &self,
        number: u64,
        timestamps: &mut HashMap<u64, u64>,
    ) -> Result<u64, LedgerError> {
        if let Some(timestamp) = timestamps.get(&number) {
            return Ok(*timestamp);
        }
        let header = self.ledger.block(number).await?;
        log::debug!(
            "Block {} ({}) at {}",
            header.number,
            header.hash.as_deref().unwrap_or("pending"),
            header.timestamp
        );
        timestamps.insert(number, header.timestamp);
        Ok(header.timestamp)
    }
}
