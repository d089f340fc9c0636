//! Core types and arithmetic for the DEX arbitrage helper
//!
//! This crate has no network access. It provides:
//! - Token, reserve and round-trip estimate types
//! - Exact price ratios and price differences
//! - Constant-product pool math
//! - Arbitrage direction and configuration types

pub mod types;
pub mod tokens;
pub mod pools;
pub mod pricing;
pub mod opportunities;
pub mod config;
pub mod errors;

pub use types::*;
pub use tokens::*;
pub use pools::*;
pub use pricing::*;
pub use opportunities::*;
pub use config::*;
pub use errors::*;
