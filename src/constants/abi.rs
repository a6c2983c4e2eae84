//! Contract interfaces the explorer understands
//!
//! Only the selectors and return shapes are used; nothing here is ever sent
//! as a signed transaction.

use alloy_sol_types::sol;

sol! {
    /// ERC-20 transfer entry points and the event they emit
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }

    /// Optional ERC-20 metadata extension
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }

    /// Single-target execute used by smart-contract wallets (`0xb61d27f6`)
    interface IExecutor {
        function execute(address dest, uint256 value, bytes func) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_selectors_match_known_codes() {
        assert_eq!(hex::encode(IERC20::transferCall::SELECTOR), "a9059cbb");
        assert_eq!(hex::encode(IERC20::transferFromCall::SELECTOR), "23b872dd");
        assert_eq!(hex::encode(IExecutor::executeCall::SELECTOR), "b61d27f6");
        assert_eq!(hex::encode(IERC20Metadata::symbolCall::SELECTOR), "95d89b41");
        assert_eq!(hex::encode(IERC20Metadata::nameCall::SELECTOR), "06fdde03");
        assert_eq!(hex::encode(IERC20Metadata::decimalsCall::SELECTOR), "313ce567");
        assert_eq!(
            hex::encode(IERC20::Transfer::SIGNATURE_HASH),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }
}
