//! Contract handles: an address plus the client used to reach it

use alloy_primitives::{Address, U256};
use futures::try_join;
use std::sync::Arc;

use dexarb_core::{ChainId, DexResult, Reserves, Token};

use crate::client::ChainClient;

/// ERC20 token contract
pub struct TokenContract<C> {
    address: Address,
    client: Arc<C>,
}

impl<C: ChainClient> TokenContract<C> {
    pub fn new(address: Address, client: Arc<C>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn decimals(&self) -> DexResult<u8> {
        self.client.decimals(self.address).await
    }

    pub async fn symbol(&self) -> DexResult<String> {
        self.client.symbol(self.address).await
    }

    pub async fn name(&self) -> DexResult<String> {
        self.client.name(self.address).await
    }

    /// Fetch decimals, symbol and name (concurrently) into a [`Token`].
    pub async fn token(&self, chain: ChainId) -> DexResult<Token> {
        let (decimals, symbol, name) = try_join!(self.decimals(), self.symbol(), self.name())?;
        Ok(Token::new(self.address, &symbol, &name, decimals, chain))
    }
}

/// Uniswap V2 factory
pub struct FactoryContract<C> {
    address: Address,
    client: Arc<C>,
}

impl<C: ChainClient> FactoryContract<C> {
    pub fn new(address: Address, client: Arc<C>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub async fn get_pair(&self, token_a: Address, token_b: Address) -> DexResult<Address> {
        self.client.get_pair(self.address, token_a, token_b).await
    }
}

/// Uniswap V2 pair.
///
/// May point at `Address::ZERO` when the factory had no pool; every call on
/// such a handle fails. Check [`PairContract::exists`] first.
pub struct PairContract<C> {
    address: Address,
    client: Arc<C>,
}

impl<C: ChainClient> PairContract<C> {
    pub fn new(address: Address, client: Arc<C>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn exists(&self) -> bool {
        !self.address.is_zero()
    }

    pub async fn get_reserves(&self) -> DexResult<Reserves> {
        self.client.get_reserves(self.address).await
    }
}

/// Uniswap V2 router (quoting only)
pub struct RouterContract<C> {
    address: Address,
    client: Arc<C>,
}

impl<C: ChainClient> RouterContract<C> {
    pub fn new(address: Address, client: Arc<C>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn get_amounts_out(&self, amount_in: U256, path: Vec<Address>) -> DexResult<Vec<U256>> {
        self.client.get_amounts_out(self.address, amount_in, path).await
    }
}
