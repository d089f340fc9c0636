//! Token definitions and utilities
//!
//! Token metadata is always read from the token contract; nothing here is a
//! static registry. Decimals differ per token (USDC/USDT use 6, WBTC 8).

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ChainId;

/// Token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub chain: ChainId,
}

impl Token {
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8, chain: ChainId) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            chain,
        }
    }

    /// Whether this token sorts first in a pair with `other`
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Order two token addresses the way a V2 pair stores them.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_tokens_is_order_independent() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0x0b);
        assert_eq!(sort_tokens(a, b), (b, a));
        assert_eq!(sort_tokens(b, a), (b, a));
    }

    #[test]
    fn test_sorts_before() {
        let dai = Token::new(Address::repeat_byte(0x01), "DAI", "Dai Stablecoin", 18, ChainId::Local);
        let weth = Token::new(Address::repeat_byte(0x02), "WETH", "Wrapped Ether", 18, ChainId::Local);
        assert!(dai.sorts_before(&weth));
        assert!(!weth.sorts_before(&dai));
    }
}
