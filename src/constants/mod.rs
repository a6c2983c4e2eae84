pub mod abi;

/// Etherscan caps a single `txlist` response at this many records
pub const EXPLORER_RESULT_CAP: usize = 10_000;

/// Decimals assumed when a token does not report its own
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Decimals of the native coin (wei -> ether)
pub const NATIVE_DECIMALS: u8 = 18;
