//! In-process chain for tests and dry runs
//!
//! Models a local development node: token contracts, V2 factories, pairs
//! and routers. Pair addresses are derived from `(factory, token0, token1)`
//! so they are stable across calls, and router quotes use the same
//! constant-product formula as the real router.

use alloy_primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use dexarb_core::{sort_tokens, ConstantProductPool, DexError, DexResult, Reserves, MAX_FEE_BPS};

use crate::client::ChainClient;

/// Seconds between the blocks of the simulated chain
const BLOCK_TIME_SECS: u32 = 12;

#[derive(Debug, Clone)]
struct TokenMetadata {
    decimals: u8,
    symbol: String,
    name: String,
}

#[derive(Debug, Default)]
struct ChainState {
    tokens: HashMap<Address, TokenMetadata>,
    /// factory -> fee in bps for its pairs
    factories: HashMap<Address, u16>,
    /// router -> factory
    routers: HashMap<Address, Address>,
    pairs: HashMap<(Address, Address, Address), Address>,
    pools: HashMap<Address, ConstantProductPool>,
    /// pair -> timestamp of the block that last touched its reserves
    pair_timestamps: HashMap<Address, u32>,
    block_timestamp: u32,
}

impl ChainState {
    /// Every state change lands in a new block.
    fn next_block(&mut self) -> u32 {
        self.block_timestamp = self.block_timestamp.wrapping_add(BLOCK_TIME_SECS);
        self.block_timestamp
    }

    fn factory_for(&self, router: Address) -> DexResult<Address> {
        self.routers
            .get(&router)
            .copied()
            .ok_or_else(|| DexError::Decode(format!("no router deployed at {}", router)))
    }

    fn pool_for(&self, factory: Address, token_a: Address, token_b: Address) -> Option<&ConstantProductPool> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        let pair = self.pairs.get(&(factory, token0, token1))?;
        self.pools.get(pair)
    }

    fn amounts_out(&self, factory: Address, amount_in: U256, path: &[Address]) -> DexResult<Vec<U256>> {
        if path.len() < 2 {
            return Err(DexError::Reverted("UniswapV2Library: INVALID_PATH".to_string()));
        }

        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);

        for hop in path.windows(2) {
            let current = amounts[amounts.len() - 1];
            if current.is_zero() {
                return Err(DexError::Reverted("UniswapV2Library: INSUFFICIENT_INPUT_AMOUNT".to_string()));
            }

            let pool = self.pool_for(factory, hop[0], hop[1]).ok_or_else(|| {
                DexError::Reverted(format!("no pair for {} / {}", hop[0], hop[1]))
            })?;
            let (reserve_in, reserve_out) = pool.reserves_for(hop[0]);
            if reserve_in.is_zero() || reserve_out.is_zero() {
                return Err(DexError::Reverted("UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string()));
            }

            amounts.push(pool.get_amount_out(current, hop[0]));
        }

        Ok(amounts)
    }
}

/// [`ChainClient`] over in-memory contract state.
#[derive(Debug, Default)]
pub struct InMemoryChain {
    state: RwLock<ChainState>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy_token(&self, address: Address, symbol: &str, name: &str, decimals: u8) {
        self.state.write().tokens.insert(
            address,
            TokenMetadata {
                decimals,
                symbol: symbol.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub fn deploy_factory(&self, factory: Address, fee_bps: u16) -> DexResult<()> {
        if fee_bps > MAX_FEE_BPS {
            return Err(DexError::Reverted(format!("fee of {} bps exceeds 100%", fee_bps)));
        }
        self.state.write().factories.insert(factory, fee_bps);
        Ok(())
    }

    pub fn deploy_router(&self, router: Address, factory: Address) -> DexResult<()> {
        let mut state = self.state.write();
        if !state.factories.contains_key(&factory) {
            return Err(DexError::Reverted(format!("no factory deployed at {}", factory)));
        }
        state.routers.insert(router, factory);
        Ok(())
    }

    /// Factory `createPair`: reverts on identical tokens or an existing pair.
    pub fn create_pair(&self, factory: Address, token_a: Address, token_b: Address) -> DexResult<Address> {
        let mut state = self.state.write();
        let fee_bps = *state
            .factories
            .get(&factory)
            .ok_or_else(|| DexError::Reverted(format!("no factory deployed at {}", factory)))?;

        if token_a == token_b {
            return Err(DexError::Reverted("UniswapV2: IDENTICAL_ADDRESSES".to_string()));
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        if token0.is_zero() {
            return Err(DexError::Reverted("UniswapV2: ZERO_ADDRESS".to_string()));
        }
        if state.pairs.contains_key(&(factory, token0, token1)) {
            return Err(DexError::Reverted("UniswapV2: PAIR_EXISTS".to_string()));
        }

        let mut seed = Vec::with_capacity(60);
        seed.extend_from_slice(factory.as_slice());
        seed.extend_from_slice(token0.as_slice());
        seed.extend_from_slice(token1.as_slice());
        let pair = Address::from_slice(&keccak256(&seed)[12..]);

        state.pairs.insert((factory, token0, token1), pair);
        state.pools.insert(pair, ConstantProductPool::new(pair, token0, token1, fee_bps));
        Ok(pair)
    }

    /// Router `addLiquidity` without the ratio checks; creates the pair on
    /// first use. Returns the pair address.
    pub fn add_liquidity(
        &self,
        router: Address,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> DexResult<Address> {
        let factory = self.state.read().factory_for(router)?;
        let (token0, token1) = sort_tokens(token_a, token_b);

        let existing = self.state.read().pairs.get(&(factory, token0, token1)).copied();
        let pair = match existing {
            Some(pair) => pair,
            None => self.create_pair(factory, token_a, token_b)?,
        };

        let mut state = self.state.write();
        let pool = state
            .pools
            .get_mut(&pair)
            .ok_or_else(|| DexError::Reverted(format!("no pair at {}", pair)))?;
        if token_a == pool.token0 {
            pool.reserve0 += amount_a;
            pool.reserve1 += amount_b;
        } else {
            pool.reserve0 += amount_b;
            pool.reserve1 += amount_a;
        }

        let timestamp = state.next_block();
        state.pair_timestamps.insert(pair, timestamp);
        Ok(pair)
    }

    /// Router `swapExactTokensForTokens` along `path`, updating reserves.
    pub fn swap_exact_tokens_for_tokens(
        &self,
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
    ) -> DexResult<Vec<U256>> {
        let mut state = self.state.write();
        let factory = state.factory_for(router)?;
        let amounts = state.amounts_out(factory, amount_in, path)?;

        let amount_out = amounts[amounts.len() - 1];
        if amount_out < amount_out_min {
            return Err(DexError::Reverted("UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT".to_string()));
        }

        let timestamp = state.next_block();
        for (hop, amount) in path.windows(2).zip(amounts.iter()) {
            let (token0, token1) = sort_tokens(hop[0], hop[1]);
            let Some(pair) = state.pairs.get(&(factory, token0, token1)).copied() else {
                continue;
            };
            if let Some(pool) = state.pools.get_mut(&pair) {
                pool.swap(*amount, hop[0]);
            }
            state.pair_timestamps.insert(pair, timestamp);
        }

        Ok(amounts)
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn decimals(&self, token: Address) -> DexResult<u8> {
        self.state
            .read()
            .tokens
            .get(&token)
            .map(|t| t.decimals)
            .ok_or_else(|| DexError::Decode(format!("empty return data from {}", token)))
    }

    async fn symbol(&self, token: Address) -> DexResult<String> {
        self.state
            .read()
            .tokens
            .get(&token)
            .map(|t| t.symbol.clone())
            .ok_or_else(|| DexError::Decode(format!("empty return data from {}", token)))
    }

    async fn name(&self, token: Address) -> DexResult<String> {
        self.state
            .read()
            .tokens
            .get(&token)
            .map(|t| t.name.clone())
            .ok_or_else(|| DexError::Decode(format!("empty return data from {}", token)))
    }

    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> DexResult<Address> {
        let state = self.state.read();
        if !state.factories.contains_key(&factory) {
            return Err(DexError::Decode(format!("empty return data from {}", factory)));
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        Ok(state
            .pairs
            .get(&(factory, token0, token1))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn get_reserves(&self, pair: Address) -> DexResult<Reserves> {
        let state = self.state.read();
        state
            .pools
            .get(&pair)
            .map(|pool| pool.reserves(state.pair_timestamps.get(&pair).copied().unwrap_or_default()))
            .ok_or_else(|| DexError::Decode(format!("empty return data from {}", pair)))
    }

    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: Vec<Address>) -> DexResult<Vec<U256>> {
        let state = self.state.read();
        let factory = state.factory_for(router)?;
        state.amounts_out(factory, amount_in, &path)
    }
}
