//! Ledger and explorer access plus the logic built on top of them

pub mod balance;
pub mod block_locator;
pub mod etherscan;
pub mod explorer;
pub mod ledger;
pub mod token_metadata;
pub mod token_transfers;

pub use block_locator::BlockTimestampLocator;
pub use etherscan::EtherscanClient;
pub use explorer::ExplorerApi;
pub use ledger::{JsonRpcLedgerClient, LedgerClient};
pub use token_metadata::{ResolverConfig, TokenMetadataResolver};
