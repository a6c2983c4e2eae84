//! Address validation and checksum normalization

use alloy_primitives::Address;
use std::fmt::Display;

/// Rejected address input, carrying the offending string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressError(pub String);

impl Display for AddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid address format: {}", self.0)
    }
}

impl std::error::Error for AddressError {}

/// `0x` followed by exactly 40 hex characters, any case
pub fn is_address_format(input: &str) -> bool {
    input.len() == 42
        && input.starts_with("0x")
        && input[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse and validate an address
///
/// All-lowercase and all-uppercase forms are accepted as-is. Mixed-case input
/// is treated as an EIP-55 checksum and must match it exactly.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    if !is_address_format(input) {
        return Err(AddressError(input.to_string()));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(&input[2..], &mut bytes).map_err(|_| AddressError(input.to_string()))?;
    let address = Address::from(bytes);

    let body = &input[2..];
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && address.to_checksum(None) != input {
        return Err(AddressError(input.to_string()));
    }

    Ok(address)
}

/// Parse an address by format alone, ignoring letter case
///
/// Wallet addresses arrive from users who often mangle the case; any
/// `0x` + 40 hex digits is served.
pub fn parse_address_any_case(input: &str) -> Result<Address, AddressError> {
    if !is_address_format(input) {
        return Err(AddressError(input.to_string()));
    }
    parse_address(&input.to_ascii_lowercase())
}

/// EIP-55 checksummed form, used for cache keys and outbound calls
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Short display form: `0xAbCd...wxyz`
pub fn abbreviate(address: &Address) -> String {
    let full = checksummed(address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
