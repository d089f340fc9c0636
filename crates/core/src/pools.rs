//! Constant-product (Uniswap V2 style) pool math

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{sort_tokens, Reserves};

/// Standard V2 fee: 0.3%, i.e. the 997/1000 factor of the router.
pub const DEFAULT_FEE_BPS: u16 = 30;

/// Basis points in 100%; the largest meaningful fee.
pub const MAX_FEE_BPS: u16 = 10_000;

/// Uniswap V2 style pool (constant product)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductPool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub fee_bps: u16,
}

impl ConstantProductPool {
    /// Empty pool for an unordered pair; tokens are stored sorted.
    pub fn new(address: Address, token_a: Address, token_b: Address, fee_bps: u16) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            address,
            token0,
            token1,
            reserve0: U256::ZERO,
            reserve1: U256::ZERO,
            fee_bps,
        }
    }

    pub fn reserves(&self, block_timestamp_last: u32) -> Reserves {
        Reserves::new(self.reserve0, self.reserve1, block_timestamp_last)
    }

    /// `(reserve_in, reserve_out)` for a swap that sells `token_in`
    pub fn reserves_for(&self, token_in: Address) -> (U256, U256) {
        if token_in == self.token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    /// Calculate output amount using constant product formula
    /// amountOut = (amountIn * fee * reserveOut) / (reserveIn * 10000 + amountIn * fee)
    pub fn get_amount_out(&self, amount_in: U256, token_in: Address) -> U256 {
        if amount_in.is_zero() {
            return U256::ZERO;
        }

        let (reserve_in, reserve_out) = self.reserves_for(token_in);

        if reserve_in.is_zero() || reserve_out.is_zero() {
            return U256::ZERO;
        }

        let fee_multiplier = U256::from(MAX_FEE_BPS.saturating_sub(self.fee_bps));
        let amount_in_with_fee = amount_in * fee_multiplier;
        let numerator = amount_in_with_fee * reserve_out;
        let denominator = reserve_in * U256::from(MAX_FEE_BPS) + amount_in_with_fee;

        numerator / denominator
    }

    /// Apply an exact-input swap to the reserves and return the output.
    pub fn swap(&mut self, amount_in: U256, token_in: Address) -> U256 {
        let amount_out = self.get_amount_out(amount_in, token_in);
        if token_in == self.token0 {
            self.reserve0 += amount_in;
            self.reserve1 -= amount_out;
        } else {
            self.reserve1 += amount_in;
            self.reserve0 -= amount_out;
        }
        amount_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{price_from_reserves, PRICE_DECIMAL_PLACES};

    fn spot_price(pool: &ConstantProductPool) -> String {
        let reserves = pool.reserves(0);
        price_from_reserves(reserves.reserve0, reserves.reserve1, PRICE_DECIMAL_PLACES)
            .unwrap()
            .to_string()
    }

    const ETHER: u128 = 1_000_000_000_000_000_000;

    fn pool_10_10() -> ConstantProductPool {
        let mut pool = ConstantProductPool::new(
            Address::repeat_byte(9),
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            DEFAULT_FEE_BPS,
        );
        pool.reserve0 = U256::from(10 * ETHER);
        pool.reserve1 = U256::from(10 * ETHER);
        pool
    }

    #[test]
    fn test_v2_constant_product() {
        let pool = ConstantProductPool {
            address: Address::ZERO,
            token0: Address::ZERO,
            token1: Address::repeat_byte(1),
            reserve0: U256::from(1_000_000_000_000u64), // 1M USDC (6 decimals)
            reserve1: U256::from(500_000_000_000_000_000_000u128), // 500 ETH (18 decimals)
            fee_bps: 30,
        };

        // Swap 1000 USDC
        let amount_in = U256::from(1_000_000_000u64); // 1000 USDC
        let amount_out = pool.get_amount_out(amount_in, Address::ZERO);

        // Should get roughly 0.5 ETH (minus fees and slippage)
        assert!(amount_out > U256::ZERO);
        assert!(amount_out < U256::from(1_000_000_000_000_000_000u128)); // Less than 1 ETH
    }

    #[test]
    fn test_matches_router_997_factor() {
        let pool = pool_10_10();
        let out = pool.get_amount_out(U256::from(ETHER), pool.token0);
        // 997e18 * 10e18 / (10e18 * 1000 + 997e18)
        assert_eq!(out, U256::from(906_610_893_880_149_131u128));
    }

    #[test]
    fn test_swap_moves_reserves() {
        let mut pool = pool_10_10();
        assert_eq!(spot_price(&pool), "1");

        let token1 = pool.token1;
        let out = pool.swap(U256::from(ETHER), token1);
        assert_eq!(pool.reserve1, U256::from(11 * ETHER));
        assert_eq!(pool.reserve0, U256::from(10 * ETHER) - out);
        assert_eq!(spot_price(&pool), "0.82667173691998644264");
    }

    #[test]
    fn test_fee_above_100_percent_quotes_nothing() {
        let mut pool = pool_10_10();
        pool.fee_bps = u16::MAX;
        assert_eq!(pool.get_amount_out(U256::from(ETHER), pool.token0), U256::ZERO);

        pool.fee_bps = MAX_FEE_BPS;
        assert_eq!(pool.get_amount_out(U256::from(ETHER), pool.token0), U256::ZERO);
    }

    #[test]
    fn test_empty_pool_quotes_nothing() {
        let pool = ConstantProductPool::new(Address::ZERO, Address::repeat_byte(1), Address::repeat_byte(2), 30);
        assert_eq!(pool.get_amount_out(U256::from(1u8), pool.token0), U256::ZERO);
        assert!(pool.reserves(0).is_empty());
    }
}
