//! `executeTrade` calldata for the on-chain arbitrage contract
//!
//! Only builds unsigned transactions. Signing and submission belong to the
//! wallet side, not here.

use alloy::sol_types::SolCall;
use alloy_primitives::{Address, Bytes, U256};

use dexarb_core::{ArbitrageDirection, ChainId};

use crate::contracts::IArbitrage;

/// Arguments of one `executeTrade` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub direction: ArbitrageDirection,
    pub token_in: Address,
    pub token_out: Address,
    pub amount: U256,
}

impl TradeRequest {
    pub fn calldata(&self) -> Bytes {
        let (start_on_a, start_on_b) = self.direction.trade_flags();
        let call = IArbitrage::executeTradeCall {
            startOnExchangeA: start_on_a,
            startOnExchangeB: start_on_b,
            tokenIn: self.token_in,
            tokenOut: self.token_out,
            amount: self.amount,
        };
        Bytes::from(call.abi_encode())
    }
}

/// Built transaction ready for signing
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub chain: ChainId,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Transaction builder
pub struct TransactionBuilder {
    chain: ChainId,
    arbitrage_contract: Address,
}

impl TransactionBuilder {
    pub fn new(chain: ChainId, arbitrage_contract: Address) -> Self {
        Self {
            chain,
            arbitrage_contract,
        }
    }

    pub fn build_execute_trade(&self, request: &TradeRequest) -> BuiltTransaction {
        BuiltTransaction {
            chain: self.chain,
            to: self.arbitrage_contract,
            value: U256::ZERO,
            data: request.calldata(),
        }
    }
}
