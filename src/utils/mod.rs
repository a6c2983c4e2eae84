pub mod address;
pub mod cache;
pub mod calldata;
pub mod env;
pub mod format;
pub mod jsonrpc;
pub mod sanitize;
pub mod serde;

#[cfg(test)]
pub mod test_utils;
