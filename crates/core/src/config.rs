//! Configuration types

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChainId, DexError, DexProtocol, DexResult};

const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// RPC endpoint selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Talk to the local development node instead of the hosted one
    #[serde(default = "default_is_local")]
    pub is_local: bool,
    #[serde(default = "default_local_url")]
    pub local_url: String,
    /// May contain `{api_key}`, substituted from `api_key`
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            is_local: default_is_local(),
            local_url: default_local_url(),
            remote_url: default_remote_url(),
            api_key: None,
        }
    }
}

impl NetworkConfig {
    /// The URL the client should connect to
    pub fn endpoint(&self) -> DexResult<String> {
        if self.is_local {
            return Ok(self.local_url.clone());
        }

        if !self.remote_url.contains(API_KEY_PLACEHOLDER) {
            return Ok(self.remote_url.clone());
        }

        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(self.remote_url.replace(API_KEY_PLACEHOLDER, key)),
            _ => Err(DexError::InvalidConfig(
                "remote_url needs an api_key but none is set".to_string(),
            )),
        }
    }
}

fn default_is_local() -> bool {
    true
}

fn default_local_url() -> String {
    "http://127.0.0.1:7545".to_string()
}

fn default_remote_url() -> String {
    "https://eth-mainnet.g.alchemy.com/v2/{api_key}".to_string()
}

/// DEX router addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexAddresses {
    pub router: Address,
    pub factory: Address,
}

/// What the price monitor watches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub token_a: Address,
    pub token_b: Address,
    pub token_c: Address,
    /// Round-trip size in whole tokens
    #[serde(default = "default_amount_in")]
    pub amount_in: Decimal,
    /// Minimum |difference| in percent before a trade is prepared
    #[serde(default = "default_difference_threshold")]
    pub difference_threshold: Decimal,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub arbitrage_contract: Option<Address>,
}

fn default_amount_in() -> Decimal {
    Decimal::ONE
}

fn default_difference_threshold() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_poll_interval_ms() -> u64 {
    12_000 // one mainnet block
}

/// Complete monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_chain")]
    pub chain: ChainId,
    #[serde(default)]
    pub network: NetworkConfig,
    pub exchanges: HashMap<DexProtocol, DexAddresses>,
    pub venue_a: DexProtocol,
    pub venue_b: DexProtocol,
    pub monitor: MonitorConfig,
}

fn default_chain() -> ChainId {
    ChainId::Ethereum
}

impl Settings {
    pub fn dex(&self, dex: DexProtocol) -> DexResult<&DexAddresses> {
        self.exchanges
            .get(&dex)
            .ok_or_else(|| DexError::InvalidConfig(format!("no addresses configured for {}", dex)))
    }

    pub fn validate(&self) -> DexResult<()> {
        if self.venue_a == self.venue_b {
            return Err(DexError::InvalidConfig(format!(
                "venue_a and venue_b are both {}",
                self.venue_a
            )));
        }
        self.dex(self.venue_a)?;
        self.dex(self.venue_b)?;
        if self.monitor.token_a == self.monitor.token_b {
            return Err(DexError::InvalidConfig("token_a and token_b are identical".to_string()));
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(DexError::InvalidConfig("poll_interval_ms must be positive".to_string()));
        }
        self.network.endpoint()?;
        Ok(())
    }
}
