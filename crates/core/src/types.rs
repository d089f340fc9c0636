//! Core type definitions

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sort_tokens;

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Ethereum,
    /// Local development node (Ganache / Anvil style)
    Local,
}

impl ChainId {
    pub fn chain_id(&self) -> u64 {
        match self {
            ChainId::Ethereum => 1,
            ChainId::Local => 1337,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Local => "local",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Uniswap V2 style exchanges the helpers can be pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexProtocol {
    Uniswap,
    SushiSwap,
    PancakeSwap,
}

impl DexProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            DexProtocol::Uniswap => "uniswap",
            DexProtocol::SushiSwap => "sushiswap",
            DexProtocol::PancakeSwap => "pancakeswap",
        }
    }
}

impl fmt::Display for DexProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reserves of a V2 pair, in the pair's own token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u32,
}

impl Reserves {
    pub fn new(reserve0: U256, reserve1: U256, block_timestamp_last: u32) -> Self {
        Self {
            reserve0,
            reserve1,
            block_timestamp_last,
        }
    }

    /// Reserves reordered as `(reserve of token_a, reserve of token_b)`.
    ///
    /// The pair stores its tokens sorted by address, so the caller's order
    /// usually differs from the pair's.
    pub fn oriented(&self, token_a: Address, token_b: Address) -> (U256, U256) {
        let (token0, _) = sort_tokens(token_a, token_b);
        if token_a == token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.block_timestamp_last), 0)
    }

    pub fn is_empty(&self) -> bool {
        self.reserve0.is_zero() || self.reserve1.is_zero()
    }
}

/// Result of quoting a two-leg A -> B -> A round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedReturn {
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

impl EstimatedReturn {
    /// `amount_out - amount_in`, negative when the round trip loses.
    pub fn profit(&self) -> Decimal {
        self.amount_out - self.amount_in
    }

    pub fn is_profitable(&self) -> bool {
        self.amount_out > self.amount_in
    }
}
