//! The seam between the helpers and a blockchain node

use alloy::providers::{ProviderBuilder, RootProvider};
use alloy::rpc::json_rpc::RpcError;
use alloy::transports::BoxTransport;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use dexarb_core::{DexError, DexResult, NetworkConfig, Reserves};

use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02, IERC20};

/// Read-only contract calls the helpers need.
///
/// Every method is a single fresh call; implementations must not cache.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn decimals(&self, token: Address) -> DexResult<u8>;

    async fn symbol(&self, token: Address) -> DexResult<String>;

    async fn name(&self, token: Address) -> DexResult<String>;

    /// Factory `getPair`; `Address::ZERO` when no pool exists.
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> DexResult<Address>;

    async fn get_reserves(&self, pair: Address) -> DexResult<Reserves>;

    /// Router `getAmountsOut`, one amount per path element.
    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: Vec<Address>) -> DexResult<Vec<U256>>;
}

/// [`ChainClient`] backed by an alloy provider.
pub struct ProviderClient {
    provider: RootProvider<BoxTransport>,
}

impl ProviderClient {
    pub fn new(provider: RootProvider<BoxTransport>) -> Self {
        Self { provider }
    }

    /// Connect to `url` (http(s) or ws(s), picked from the scheme).
    pub async fn connect(url: &str) -> DexResult<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(url)
            .await
            .map_err(|e| DexError::Rpc(format!("connect {}: {}", url, e)))?;
        Ok(Self::new(provider))
    }

    /// Connect to the local or the hosted node, whichever `network` selects.
    pub async fn from_config(network: &NetworkConfig) -> DexResult<Self> {
        let url = network.endpoint()?;
        info!(local = network.is_local, "Connecting to RPC node");
        Self::connect(&url).await
    }
}

/// A node answers a reverted `eth_call` with a JSON-RPC error response;
/// anything else on the transport is a connectivity failure.
fn contract_error(err: alloy::contract::Error) -> DexError {
    match err {
        alloy::contract::Error::AbiError(e) => DexError::Decode(e.to_string()),
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => DexError::Reverted(payload.to_string()),
        alloy::contract::Error::TransportError(e) => DexError::Rpc(e.to_string()),
        other => DexError::Reverted(other.to_string()),
    }
}

#[async_trait]
impl ChainClient for ProviderClient {
    async fn decimals(&self, token: Address) -> DexResult<u8> {
        let erc20 = IERC20::new(token, &self.provider);
        let ret = erc20.decimals().call().await.map_err(contract_error)?;
        Ok(ret._0)
    }

    async fn symbol(&self, token: Address) -> DexResult<String> {
        let erc20 = IERC20::new(token, &self.provider);
        let ret = erc20.symbol().call().await.map_err(contract_error)?;
        Ok(ret._0)
    }

    async fn name(&self, token: Address) -> DexResult<String> {
        let erc20 = IERC20::new(token, &self.provider);
        let ret = erc20.name().call().await.map_err(contract_error)?;
        Ok(ret._0)
    }

    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> DexResult<Address> {
        let factory = IUniswapV2Factory::new(factory, &self.provider);
        let ret = factory
            .getPair(token_a, token_b)
            .call()
            .await
            .map_err(contract_error)?;
        debug!(%token_a, %token_b, pair = %ret.pair, "getPair");
        Ok(ret.pair)
    }

    async fn get_reserves(&self, pair: Address) -> DexResult<Reserves> {
        let contract = IUniswapV2Pair::new(pair, &self.provider);
        let ret = contract.getReserves().call().await.map_err(contract_error)?;
        debug!(%pair, reserve0 = %ret.reserve0, reserve1 = %ret.reserve1, "getReserves");
        Ok(Reserves::new(
            U256::from(ret.reserve0),
            U256::from(ret.reserve1),
            ret.blockTimestampLast,
        ))
    }

    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: Vec<Address>) -> DexResult<Vec<U256>> {
        let contract = IUniswapV2Router02::new(router, &self.provider);
        let ret = contract
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(contract_error)?;
        debug!(%router, %amount_in, amounts = ?ret.amounts, "getAmountsOut");
        Ok(ret.amounts)
    }
}
