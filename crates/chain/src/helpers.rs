//! Token, pair and price lookups against V2 style contracts
//!
//! Every function is a fresh read; nothing is cached and nothing is
//! retried. Errors go straight back to the caller.

use alloy_primitives::{Address, U256};
use futures::try_join;
use std::sync::Arc;
use tracing::debug;

use dexarb_core::{
    from_base_units, price_from_reserves, ChainId, DexError, DexResult, EstimatedReturn, Price, Reserves,
    Token, ETHER_DECIMALS, PRICE_DECIMAL_PLACES,
};

use crate::client::ChainClient;
use crate::handles::{FactoryContract, PairContract, RouterContract, TokenContract};

pub use dexarb_core::calculate_difference;

/// Three token handles with the metadata read from them
pub struct TokenSet<C> {
    pub contracts: [TokenContract<C>; 3],
    pub tokens: [Token; 3],
}

/// Open handles for three tokens and read their decimals, symbol and name.
///
/// The three lookups run concurrently; any failed call fails the whole set.
pub async fn get_token_and_contract<C: ChainClient>(
    client: &Arc<C>,
    chain: ChainId,
    token_a: Address,
    token_b: Address,
    token_c: Address,
) -> DexResult<TokenSet<C>> {
    let contracts = [token_a, token_b, token_c].map(|address| TokenContract::new(address, Arc::clone(client)));

    let (a, b, c) = try_join!(
        contracts[0].token(chain),
        contracts[1].token(chain),
        contracts[2].token(chain),
    )?;
    debug!(a = %a, b = %b, c = %c, "Fetched token metadata");

    Ok(TokenSet {
        contracts,
        tokens: [a, b, c],
    })
}

/// Pair address for an unordered token pair, `Address::ZERO` if there is none.
pub async fn get_pair_address<C: ChainClient>(
    factory: &FactoryContract<C>,
    token_a: Address,
    token_b: Address,
) -> DexResult<Address> {
    factory.get_pair(token_a, token_b).await
}

/// Handle on the pair contract. Not guarded: a missing pair yields a handle
/// on the zero address.
pub async fn get_pair_contract<C: ChainClient>(
    factory: &FactoryContract<C>,
    token_a: Address,
    token_b: Address,
) -> DexResult<PairContract<C>> {
    let pair = get_pair_address(factory, token_a, token_b).await?;
    if pair.is_zero() {
        debug!(%token_a, %token_b, factory = %factory.address(), "No pair deployed");
    }
    Ok(PairContract::new(pair, Arc::clone(factory.client())))
}

/// `[reserve0, reserve1]` in the pair's own token order.
pub async fn get_reserves<C: ChainClient>(pair: &PairContract<C>) -> DexResult<Reserves> {
    pair.get_reserves().await
}

/// `reserve0 / reserve1` of the pair, exact to 20 fractional digits.
pub async fn calculate_price<C: ChainClient>(pair: &PairContract<C>) -> DexResult<Price> {
    let reserves = get_reserves(pair).await?;
    price_from_reserves(reserves.reserve0, reserves.reserve1, PRICE_DECIMAL_PLACES)
}

/// Quote `amount_in` of `token_a` through the router to `token_b` and back.
///
/// Both legs are read-only `getAmountsOut` calls, so the second leg is quoted
/// against the same reserves as the first. Amounts are scaled by 10^18
/// whatever the tokens' own decimals are.
pub async fn get_estimated_return<C: ChainClient>(
    amount_in: U256,
    router: &RouterContract<C>,
    token_a: Address,
    token_b: Address,
) -> DexResult<EstimatedReturn> {
    get_cross_venue_return(amount_in, router, router, token_a, token_b).await
}

/// Like [`get_estimated_return`], but buys on `buy_router` and sells the
/// proceeds back on `sell_router`.
pub async fn get_cross_venue_return<C: ChainClient>(
    amount_in: U256,
    buy_router: &RouterContract<C>,
    sell_router: &RouterContract<C>,
    token_a: Address,
    token_b: Address,
) -> DexResult<EstimatedReturn> {
    let trade1 = buy_router.get_amounts_out(amount_in, vec![token_a, token_b]).await?;
    let (sent, received) = first_and_last(&trade1)?;

    let trade2 = sell_router.get_amounts_out(received, vec![token_b, token_a]).await?;
    let (_, returned) = first_and_last(&trade2)?;

    debug!(
        buy = %buy_router.address(),
        sell = %sell_router.address(),
        %sent,
        %received,
        %returned,
        "Round trip quoted"
    );

    Ok(EstimatedReturn {
        amount_in: from_base_units(sent, ETHER_DECIMALS)?,
        amount_out: from_base_units(returned, ETHER_DECIMALS)?,
    })
}

fn first_and_last(amounts: &[U256]) -> DexResult<(U256, U256)> {
    match amounts {
        [first, .., last] => Ok((*first, *last)),
        _ => Err(DexError::Decode(format!(
            "getAmountsOut returned {} amounts for a two-token path",
            amounts.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryChain;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const ETHER: u128 = 1_000_000_000_000_000_000;

    // DAI sorts before WETH, so DAI is token0 of every pair below
    fn dai() -> Address {
        Address::repeat_byte(0x11)
    }
    fn weth() -> Address {
        Address::repeat_byte(0x22)
    }
    fn link() -> Address {
        Address::repeat_byte(0x33)
    }

    const UNI_FACTORY: u8 = 0xf1;
    const UNI_ROUTER: u8 = 0xa1;
    const SUSHI_FACTORY: u8 = 0xf2;
    const SUSHI_ROUTER: u8 = 0xa2;

    fn local_chain() -> Arc<InMemoryChain> {
        let chain = InMemoryChain::new();
        chain.deploy_token(weth(), "WETH", "Mock WETH", 18);
        chain.deploy_token(dai(), "DAI", "Mock DAI", 18);
        chain.deploy_token(link(), "LINK", "Mock LINK", 18);

        for (factory, router) in [(UNI_FACTORY, UNI_ROUTER), (SUSHI_FACTORY, SUSHI_ROUTER)] {
            chain.deploy_factory(Address::repeat_byte(factory), 30).unwrap();
            chain
                .deploy_router(Address::repeat_byte(router), Address::repeat_byte(factory))
                .unwrap();
        }
        Arc::new(chain)
    }

    fn seed(chain: &InMemoryChain, router: u8, weth_amount: u128, dai_amount: u128) {
        chain
            .add_liquidity(
                Address::repeat_byte(router),
                weth(),
                dai(),
                U256::from(weth_amount),
                U256::from(dai_amount),
            )
            .unwrap();
    }

    fn factory(chain: &Arc<InMemoryChain>, byte: u8) -> FactoryContract<InMemoryChain> {
        FactoryContract::new(Address::repeat_byte(byte), Arc::clone(chain))
    }

    fn router(chain: &Arc<InMemoryChain>, byte: u8) -> RouterContract<InMemoryChain> {
        RouterContract::new(Address::repeat_byte(byte), Arc::clone(chain))
    }

    #[tokio::test]
    async fn test_token_metadata_is_fetched() {
        let chain = local_chain();
        let set = get_token_and_contract(&chain, ChainId::Local, weth(), dai(), link())
            .await
            .unwrap();

        assert_eq!(set.tokens[0].symbol, "WETH");
        assert_eq!(set.tokens[1].name, "Mock DAI");
        assert_eq!(set.tokens[2].decimals, 18);
        assert_eq!(set.tokens[2].chain, ChainId::Local);
        assert_eq!(set.contracts[1].address(), dai());
    }

    #[tokio::test]
    async fn test_non_token_address_fails_metadata() {
        let chain = local_chain();
        let err = get_token_and_contract(&chain, ChainId::Local, weth(), Address::repeat_byte(0x99), link())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DexError::Decode(_)));
    }

    #[tokio::test]
    async fn test_pair_address_zero_until_created() {
        let chain = local_chain();
        let uni = factory(&chain, UNI_FACTORY);

        assert_eq!(get_pair_address(&uni, weth(), dai()).await.unwrap(), Address::ZERO);

        seed(&chain, UNI_ROUTER, 10 * ETHER, 10 * ETHER);
        let first = get_pair_address(&uni, weth(), dai()).await.unwrap();
        let again = get_pair_address(&uni, weth(), dai()).await.unwrap();
        let reversed = get_pair_address(&uni, dai(), weth()).await.unwrap();

        assert!(!first.is_zero());
        assert_eq!(first, again);
        assert_eq!(first, reversed);
    }

    #[tokio::test]
    async fn test_missing_pair_handle_fails_on_use() {
        let chain = local_chain();
        let pair = get_pair_contract(&factory(&chain, UNI_FACTORY), weth(), link())
            .await
            .unwrap();

        assert!(!pair.exists());
        assert_eq!(pair.address(), Address::ZERO);
        assert!(get_reserves(&pair).await.is_err());
    }

    #[tokio::test]
    async fn test_reserves_follow_pair_order_and_are_stable() {
        let chain = local_chain();
        seed(&chain, UNI_ROUTER, 10 * ETHER, 20 * ETHER);
        let pair = get_pair_contract(&factory(&chain, UNI_FACTORY), weth(), dai())
            .await
            .unwrap();

        let first = get_reserves(&pair).await.unwrap();
        let second = get_reserves(&pair).await.unwrap();
        assert_eq!(first, second);

        // token0 is DAI even though liquidity was added WETH first
        assert_eq!((first.reserve0, first.reserve1), (U256::from(20 * ETHER), U256::from(10 * ETHER)));
        assert_eq!(first.oriented(weth(), dai()), (U256::from(10 * ETHER), U256::from(20 * ETHER)));
        assert_eq!(calculate_price(&pair).await.unwrap().as_str(), "2");
    }

    #[tokio::test]
    async fn test_price_moves_after_swap() {
        let chain = local_chain();
        seed(&chain, SUSHI_ROUTER, 10 * ETHER, 10 * ETHER);
        seed(&chain, UNI_ROUTER, 10 * ETHER, 10 * ETHER);

        let sushi_pair = get_pair_contract(&factory(&chain, SUSHI_FACTORY), weth(), dai())
            .await
            .unwrap();
        let uni_pair = get_pair_contract(&factory(&chain, UNI_FACTORY), weth(), dai())
            .await
            .unwrap();

        let before = calculate_price(&sushi_pair).await.unwrap();
        assert_eq!(before.as_str(), "1");

        // 1 WETH in: reserves become 9.0934.. DAI / 11 WETH
        chain
            .swap_exact_tokens_for_tokens(
                Address::repeat_byte(SUSHI_ROUTER),
                U256::from(ETHER),
                U256::ZERO,
                &[weth(), dai()],
            )
            .unwrap();

        let after = calculate_price(&sushi_pair).await.unwrap();
        assert_eq!(after.as_str(), "0.82667173691998644264");
        assert!(calculate_difference(&after, &before).unwrap().starts_with('-'));

        let reference = calculate_price(&uni_pair).await.unwrap();
        assert_eq!(reference.as_str(), "1");
        assert_eq!(calculate_difference(&after, &reference).unwrap(), "-17.33");
        assert_eq!(calculate_difference(&reference, &reference).unwrap(), "0.00");
    }

    #[tokio::test]
    async fn test_drained_pair_price_is_division_by_zero() {
        let chain = local_chain();
        seed(&chain, UNI_ROUTER, 0, 10 * ETHER);
        let pair = get_pair_contract(&factory(&chain, UNI_FACTORY), weth(), dai())
            .await
            .unwrap();

        let err = calculate_price(&pair).await.unwrap_err();
        assert!(matches!(err, DexError::DivisionByZero(_)));
    }

    #[tokio::test]
    async fn test_round_trip_on_deep_pool_costs_about_two_fees() {
        let chain = local_chain();
        seed(&chain, UNI_ROUTER, 1_000_000 * ETHER, 1_000_000 * ETHER);

        let est = get_estimated_return(U256::from(ETHER), &router(&chain, UNI_ROUTER), weth(), dai())
            .await
            .unwrap();

        assert_eq!(est.amount_in, Decimal::ONE);
        assert_eq!(est.amount_out, Decimal::from_str("0.994007020923075277").unwrap());
        // two 0.3% legs
        assert!(est.amount_out >= Decimal::from_str("0.994").unwrap());
        assert!(!est.is_profitable());
    }

    #[tokio::test]
    async fn test_round_trip_without_fee_returns_input() {
        let chain = InMemoryChain::new();
        let (factory, router_addr) = (Address::repeat_byte(0xf9), Address::repeat_byte(0xa9));
        chain.deploy_factory(factory, 0).unwrap();
        chain.deploy_router(router_addr, factory).unwrap();
        chain
            .add_liquidity(
                router_addr,
                weth(),
                dai(),
                U256::from(1_000_000 * ETHER),
                U256::from(1_000_000 * ETHER),
            )
            .unwrap();
        let chain = Arc::new(chain);

        let est = get_estimated_return(U256::from(ETHER), &RouterContract::new(router_addr, chain), weth(), dai())
            .await
            .unwrap();

        let drift = (est.amount_in - est.amount_out).abs();
        assert!(drift < Decimal::from_str("0.00001").unwrap());
    }

    #[tokio::test]
    async fn test_round_trip_without_pool_fails() {
        let chain = local_chain();
        let err = get_estimated_return(U256::from(ETHER), &router(&chain, UNI_ROUTER), weth(), link())
            .await
            .unwrap_err();
        assert!(matches!(err, DexError::Reverted(_)));
    }

    #[tokio::test]
    async fn test_cross_venue_round_trip_profits_from_gap() {
        let chain = local_chain();
        // DAI is cheap on Uniswap (20 per WETH) and dear on Sushiswap (10 per WETH)
        seed(&chain, UNI_ROUTER, 100 * ETHER, 2_000 * ETHER);
        seed(&chain, SUSHI_ROUTER, 100 * ETHER, 1_000 * ETHER);

        let est = get_cross_venue_return(
            U256::from(ETHER),
            &router(&chain, UNI_ROUTER),
            &router(&chain, SUSHI_ROUTER),
            weth(),
            dai(),
        )
        .await
        .unwrap();

        assert_eq!(est.amount_in, Decimal::ONE);
        assert!(est.is_profitable());
        assert!(est.amount_out > Decimal::from_str("1.9").unwrap());
    }

    #[test]
    fn test_first_and_last() {
        let amounts = [U256::from(1u8), U256::from(2u8), U256::from(3u8)];
        assert_eq!(first_and_last(&amounts).unwrap(), (U256::from(1u8), U256::from(3u8)));
        assert!(first_and_last(&amounts[..1]).is_err());
    }
}
