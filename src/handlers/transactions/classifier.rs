//! Transfer classification
//!
//! Looks at one transaction's call data and decides whether it moved ether,
//! an ERC-20 token directly, or an ERC-20 token through a wallet's
//! `execute(address,uint256,bytes)` wrapper.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;

use crate::constants::abi::{IERC20, IExecutor};
use crate::services::explorer::RawTransaction;
use crate::utils::calldata;

/// Byte offset of the embedded call when the wrapper packs it right after
/// the destination and value words instead of ABI-encoding it
const PACKED_INNER_CALL_OFFSET: usize = 4 + 32 * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferKind {
    NativeTransfer,
    DirectTokenTransfer,
    ProxiedTokenTransfer,
    /// Contract creation whose payload matches no known shape
    Unknown,
}

impl TransferKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransferKind::NativeTransfer => "ETH Transfer",
            TransferKind::DirectTokenTransfer => "Token Transfer",
            TransferKind::ProxiedTokenTransfer => "Token Transfer (Proxy)",
            TransferKind::Unknown => "Contract Interaction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
    Unknown,
}

impl Direction {
    /// `from == reference` wins over `to == reference` (self-transfers are outgoing)
    pub fn relative_to(tx: &RawTransaction, reference: &Address) -> Self {
        if tx.from == *reference {
            Direction::Outgoing
        } else if tx.to.as_ref() == Some(reference) {
            Direction::Incoming
        } else {
            Direction::Unknown
        }
    }
}

/// Token contract and raw amount, always together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMovement {
    pub contract: Address,
    /// Smallest unit, before applying decimals
    pub amount_raw: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedTransfer {
    kind: TransferKind,
    token: Option<TokenMovement>,
    direction: Direction,
}

impl ClassifiedTransfer {
    fn plain(kind: TransferKind, direction: Direction) -> Self {
        Self {
            kind,
            token: None,
            direction,
        }
    }

    fn token(kind: TransferKind, token: TokenMovement, direction: Direction) -> Self {
        Self {
            kind,
            token: Some(token),
            direction,
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn token_movement(&self) -> Option<&TokenMovement> {
        self.token.as_ref()
    }

    pub fn token_contract(&self) -> Option<Address> {
        self.token.map(|token| token.contract)
    }

    pub fn token_amount_raw(&self) -> Option<U256> {
        self.token.map(|token| token.amount_raw)
    }
}

/// Amount carried by a bare `transfer`/`transferFrom` payload
fn erc20_amount(input: &str) -> Option<U256> {
    let selector = calldata::selector(input)?;
    if selector == IERC20::transferCall::SELECTOR {
        calldata::word_as_u256(input, 1)
    } else if selector == IERC20::transferFromCall::SELECTOR {
        calldata::word_as_u256(input, 2)
    } else {
        None
    }
}

/// Token moved by an `execute(dest, value, func)` wrapper, if `func` is a transfer
fn proxied_movement(input: &str) -> Option<TokenMovement> {
    let contract = calldata::word_as_address(input, 0)?;

    let amount_raw = calldata::dynamic_bytes(input, 2)
        .and_then(erc20_amount)
        .or_else(|| erc20_amount(calldata::tail(input, PACKED_INNER_CALL_OFFSET)))?;

    Some(TokenMovement {
        contract,
        amount_raw,
    })
}

/// Classify `tx` from the point of view of `reference`
///
/// Never fails: payloads that do not decode fall through to the native
/// transfer case.
pub fn classify(tx: &RawTransaction, reference: &Address) -> ClassifiedTransfer {
    let direction = Direction::relative_to(tx, reference);
    let input = tx.input_data.as_str();

    if calldata::selector(input) == Some(IExecutor::executeCall::SELECTOR) {
        if let Some(movement) = proxied_movement(input) {
            return ClassifiedTransfer::token(
                TransferKind::ProxiedTokenTransfer,
                movement,
                direction,
            );
        }
    } else if let (Some(contract), Some(amount_raw)) = (tx.to, erc20_amount(input)) {
        return ClassifiedTransfer::token(
            TransferKind::DirectTokenTransfer,
            TokenMovement {
                contract,
                amount_raw,
            },
            direction,
        );
    }

    if tx.to.is_none() && !calldata::is_empty(input) {
        ClassifiedTransfer::plain(TransferKind::Unknown, direction)
    } else {
        ClassifiedTransfer::plain(TransferKind::NativeTransfer, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    fn wallet() -> Address {
        Address::with_last_byte(0xaa)
    }

    fn token() -> Address {
        Address::with_last_byte(0x70)
    }

    fn tx(to: Option<Address>, input: String) -> RawTransaction {
        RawTransaction {
            hash: "0x01".to_string(),
            from: wallet(),
            to,
            value_wei: U256::ZERO,
            input_data: input,
            block_number: 1,
            block_hash: String::new(),
            timestamp: 0,
            gas: String::new(),
            gas_used: String::new(),
            gas_price: String::new(),
            transaction_index: 0,
            is_error: false,
        }
    }

    fn hex_call(bytes: Vec<u8>) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    fn transfer_input(amount: u64) -> Vec<u8> {
        IERC20::transferCall {
            to: Address::with_last_byte(0xbb),
            amount: U256::from(amount),
        }
        .abi_encode()
    }

    #[test]
    fn test_empty_input_is_native_transfer() {
        for input in ["", "0x"] {
            let classified = classify(&tx(Some(Address::with_last_byte(1)), input.into()), &wallet());
            assert_eq!(classified.kind(), TransferKind::NativeTransfer);
            assert_eq!(classified.token_contract(), None);
            assert_eq!(classified.token_amount_raw(), None);
            assert_eq!(classified.direction(), Direction::Outgoing);
        }
    }

    #[test]
    fn test_direct_transfer() {
        let classified = classify(&tx(Some(token()), hex_call(transfer_input(1_000_000))), &wallet());
        assert_eq!(classified.kind(), TransferKind::DirectTokenTransfer);
        assert_eq!(classified.token_contract(), Some(token()));
        assert_eq!(classified.token_amount_raw(), Some(U256::from(1_000_000u64)));
    }

    #[test]
    fn test_direct_transfer_from_uses_third_word() {
        let input = IERC20::transferFromCall {
            from: Address::with_last_byte(1),
            to: Address::with_last_byte(2),
            amount: U256::from(42u64),
        }
        .abi_encode();
        let classified = classify(&tx(Some(token()), hex_call(input)), &wallet());
        assert_eq!(classified.kind(), TransferKind::DirectTokenTransfer);
        assert_eq!(classified.token_amount_raw(), Some(U256::from(42u64)));
    }

    #[test]
    fn test_selector_match_is_case_insensitive() {
        let input = hex_call(transfer_input(5)).replace("a9059cbb", "A9059CBB");
        let classified = classify(&tx(Some(token()), input), &wallet());
        assert_eq!(classified.kind(), TransferKind::DirectTokenTransfer);
    }

    #[test]
    fn test_truncated_transfer_falls_back_to_native() {
        let mut input = hex_call(transfer_input(5));
        input.truncate(2 + 8 + 64 + 10);
        let classified = classify(&tx(Some(token()), input), &wallet());
        assert_eq!(classified.kind(), TransferKind::NativeTransfer);
        assert_eq!(classified.token_movement(), None);
    }

    #[test]
    fn test_proxied_transfer_abi_encoded() {
        let input = IExecutor::executeCall {
            dest: token(),
            value: U256::ZERO,
            func: Bytes::from(transfer_input(2_500_000)),
        }
        .abi_encode();
        let wallet_contract = Address::with_last_byte(0x5a);
        let classified = classify(&tx(Some(wallet_contract), hex_call(input)), &wallet());

        assert_eq!(classified.kind(), TransferKind::ProxiedTokenTransfer);
        assert_eq!(classified.token_contract(), Some(token()));
        assert_eq!(classified.token_amount_raw(), Some(U256::from(2_500_000u64)));
    }

    #[test]
    fn test_proxied_transfer_packed() {
        let mut input = IExecutor::executeCall::SELECTOR.to_vec();
        input.extend_from_slice(&[0u8; 12]);
        input.extend_from_slice(token().as_slice());
        input.extend_from_slice(&[0u8; 32]);
        input.extend_from_slice(&transfer_input(7));

        let classified = classify(&tx(Some(Address::with_last_byte(0x5a)), hex_call(input)), &wallet());
        assert_eq!(classified.kind(), TransferKind::ProxiedTokenTransfer);
        assert_eq!(classified.token_contract(), Some(token()));
        assert_eq!(classified.token_amount_raw(), Some(U256::from(7u64)));
    }

    #[test]
    fn test_proxied_non_transfer_is_native() {
        let input = IExecutor::executeCall {
            dest: token(),
            value: U256::from(1u64),
            func: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        }
        .abi_encode();
        let classified = classify(&tx(Some(Address::with_last_byte(0x5a)), hex_call(input)), &wallet());
        assert_eq!(classified.kind(), TransferKind::NativeTransfer);
        assert_eq!(classified.token_contract(), None);
    }

    #[test]
    fn test_contract_creation() {
        let deploy = classify(&tx(None, "0x6080604052".to_string()), &wallet());
        assert_eq!(deploy.kind(), TransferKind::Unknown);
        assert_eq!(deploy.token_movement(), None);

        // A transfer payload without a target cannot name its token
        let orphan = classify(&tx(None, hex_call(transfer_input(1))), &wallet());
        assert_eq!(orphan.kind(), TransferKind::Unknown);
    }

    #[test]
    fn test_direction() {
        let mut incoming = tx(Some(wallet()), "0x".to_string());
        incoming.from = Address::with_last_byte(0x01);
        assert_eq!(classify(&incoming, &wallet()).direction(), Direction::Incoming);

        let unrelated = tx(Some(token()), "0x".to_string());
        assert_eq!(
            classify(&unrelated, &Address::with_last_byte(0x99)).direction(),
            Direction::Unknown
        );
    }
}
