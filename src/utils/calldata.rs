//! Hex call-data slicing
//!
//! Fixed-offset access to the selector and 32-byte ABI words of a
//! `0x`-prefixed call payload. Nothing in here fails: truncated or malformed
//! input simply yields `None`, so callers can treat "not decodable" the same
//! as "not present".

use alloy_primitives::{Address, U256};

/// Hex characters per ABI word
const WORD_HEX: usize = 64;
/// Hex characters taken by the 4-byte selector
const SELECTOR_HEX: usize = 8;

/// Strip the optional `0x` prefix
fn digits(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// True when the payload carries no call at all (`""` or `"0x"`)
pub fn is_empty(input: &str) -> bool {
    digits(input).is_empty()
}

/// The 4-byte function selector, or `None` when the payload is shorter than that
pub fn selector(input: &str) -> Option<[u8; 4]> {
    let hex_selector = digits(input).get(..SELECTOR_HEX)?;
    let mut out = [0u8; 4];
    hex::decode_to_slice(hex_selector, &mut out).ok()?;
    Some(out)
}

/// The 64 hex characters of argument word `index`, if the payload is long enough
pub fn word(input: &str, index: usize) -> Option<&str> {
    let start = SELECTOR_HEX + WORD_HEX * index;
    digits(input).get(start..start + WORD_HEX)
}

/// Argument word `index` as an unsigned 256-bit integer
pub fn word_as_u256(input: &str, index: usize) -> Option<U256> {
    U256::from_str_radix(word(input, index)?, 16).ok()
}

/// Argument word `index` read as a right-aligned 20-byte address
pub fn word_as_address(input: &str, index: usize) -> Option<Address> {
    let address_hex = word(input, index)?.get(24..)?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(address_hex, &mut out).ok()?;
    Some(Address::from(out))
}

/// Everything after the first `byte_offset` bytes of the payload, as bare hex
///
/// Returns an empty string when the payload is shorter than the offset.
pub fn tail(input: &str, byte_offset: usize) -> &str {
    digits(input).get(byte_offset * 2..).unwrap_or("")
}

/// Dynamic `bytes` argument at word `index`, following its ABI offset
///
/// The head word holds a byte offset relative to the start of the arguments;
/// the length word sits there and the payload follows it.
pub fn dynamic_bytes(input: &str, index: usize) -> Option<&str> {
    let offset = word_as_u256(input, index)?;
    let offset: usize = offset.try_into().ok()?;
    let args = digits(input).get(SELECTOR_HEX..)?;

    let length_start = offset.checked_mul(2)?;
    let length_hex = args.get(length_start..length_start.checked_add(WORD_HEX)?)?;
    let length: usize = U256::from_str_radix(length_hex, 16).ok()?.try_into().ok()?;

    let data_start = length_start + WORD_HEX;
    args.get(data_start..data_start.checked_add(length.checked_mul(2)?)?)
}
