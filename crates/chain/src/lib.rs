//! DEX query and pricing helpers
//!
//! - Token metadata, pair lookup and reserve reads over a [`ChainClient`]
//! - Spot price, price difference and round-trip estimates
//! - An alloy-backed client and an in-memory one for tests
//! - `executeTrade` calldata for the arbitrage contract

pub mod contracts;
pub mod client;
pub mod handles;
pub mod helpers;
pub mod memory;
pub mod trade;

pub use client::{ChainClient, ProviderClient};
pub use handles::{FactoryContract, PairContract, RouterContract, TokenContract};
pub use helpers::{
    calculate_difference, calculate_price, get_cross_venue_return, get_estimated_return, get_pair_address,
    get_pair_contract, get_reserves, get_token_and_contract, TokenSet,
};
pub use memory::InMemoryChain;
pub use trade::{BuiltTransaction, TradeRequest, TransactionBuilder};
