//! Arbitrage opportunity types

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::{parse_difference, DexProtocol, DexResult, EstimatedReturn};

/// Which venue to buy on first.
///
/// Prices are quoted as `reserve0 / reserve1`, so a higher price on a venue
/// means the pair's second token is dearer there; the trade starts on the
/// cheaper venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArbitrageDirection {
    /// Buy on venue A, sell on venue B
    StartOnA,
    /// Buy on venue B, sell on venue A
    StartOnB,
}

impl ArbitrageDirection {
    /// Direction for a `calculate_difference(price_a, price_b)` result, or
    /// `None` while `|difference| < threshold`.
    pub fn from_difference(difference: &str, threshold: Decimal) -> DexResult<Option<Self>> {
        let diff = parse_difference(difference)?;
        let threshold = threshold.abs();

        Ok(if diff >= threshold && !diff.is_zero() {
            Some(ArbitrageDirection::StartOnB)
        } else if diff <= -threshold && !diff.is_zero() {
            Some(ArbitrageDirection::StartOnA)
        } else {
            None
        })
    }

    pub fn opposite(&self) -> Self {
        match self {
            ArbitrageDirection::StartOnA => ArbitrageDirection::StartOnB,
            ArbitrageDirection::StartOnB => ArbitrageDirection::StartOnA,
        }
    }

    /// `(startOnExchangeA, startOnExchangeB)` flags of `executeTrade`
    pub fn trade_flags(&self) -> (bool, bool) {
        match self {
            ArbitrageDirection::StartOnA => (true, false),
            ArbitrageDirection::StartOnB => (false, true),
        }
    }

    /// `(buy venue, sell venue)`
    pub fn venues(&self, venue_a: DexProtocol, venue_b: DexProtocol) -> (DexProtocol, DexProtocol) {
        match self {
            ArbitrageDirection::StartOnA => (venue_a, venue_b),
            ArbitrageDirection::StartOnB => (venue_b, venue_a),
        }
    }
}

/// A price gap between two venues, with the round trip quoted on the buy venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub direction: ArbitrageDirection,
    pub buy_venue: DexProtocol,
    pub sell_venue: DexProtocol,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub difference_pct: Decimal,
    pub estimate: EstimatedReturn,
    pub detected_at_ms: u64,
}

impl ArbitrageOpportunity {
    /// Check if the quoted round trip returns more than it costs
    pub fn is_profitable(&self) -> bool {
        self.estimate.is_profitable()
    }
}
