//! Error types

use thiserror::Error;

/// Errors surfaced by the pricing helpers.
///
/// Nothing in this workspace recovers from these locally; every variant is
/// propagated to whoever is driving the helpers.
#[derive(Debug, Error)]
pub enum DexError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call reverted: {0}")]
    Reverted(String),

    #[error("Malformed contract response: {0}")]
    Decode(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type DexResult<T> = Result<T, DexError>;
