//! Two-venue price monitor

use alloy_primitives::{Address, U256};
use futures::try_join;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use dexarb_chain::{
    calculate_difference, calculate_price, get_cross_venue_return, get_pair_contract, get_reserves,
    get_token_and_contract, BuiltTransaction, ChainClient, FactoryContract, PairContract, RouterContract,
    TradeRequest, TransactionBuilder,
};
use dexarb_core::{
    parse_difference, to_base_units, ArbitrageDirection, ArbitrageOpportunity, DexError, DexProtocol, DexResult,
    Price, Settings, Token,
};

/// One exchange's factory, router and the watched pair on it
pub struct Venue<C> {
    pub dex: DexProtocol,
    pub router: RouterContract<C>,
    pub pair: PairContract<C>,
}

/// Result of one poll
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub price_a: Price,
    pub price_b: Price,
    pub difference: String,
    pub opportunity: Option<ArbitrageOpportunity>,
    pub trade: Option<BuiltTransaction>,
}

/// Polls the same pair on two venues
pub struct PriceMonitor<C> {
    venue_a: Venue<C>,
    venue_b: Venue<C>,
    tokens: [Token; 3],
    amount_in: U256,
    threshold: Decimal,
    builder: Option<TransactionBuilder>,
}

impl<C: ChainClient> PriceMonitor<C> {
    /// Resolve tokens and pairs. Fails if either venue has no pool for
    /// `token_a`/`token_b`.
    pub async fn new(client: Arc<C>, settings: &Settings) -> DexResult<Self> {
        let monitor = &settings.monitor;
        let set = get_token_and_contract(&client, settings.chain, monitor.token_a, monitor.token_b, monitor.token_c)
            .await?;
        let [token_a, token_b, token_c] = set.tokens;
        info!(%token_a, %token_b, %token_c, "Tokens loaded");

        let venue_a = open_venue(&client, settings, settings.venue_a, &token_a, &token_b).await?;
        let venue_b = open_venue(&client, settings, settings.venue_b, &token_a, &token_b).await?;

        let amount_in = to_base_units(monitor.amount_in, token_a.decimals)?;
        let builder = monitor
            .arbitrage_contract
            .map(|contract| TransactionBuilder::new(settings.chain, contract));

        Ok(Self {
            venue_a,
            venue_b,
            tokens: [token_a, token_b, token_c],
            amount_in,
            threshold: monitor.difference_threshold,
            builder,
        })
    }

    fn token_a(&self) -> Address {
        self.tokens[0].address
    }

    fn token_b(&self) -> Address {
        self.tokens[1].address
    }

    /// Price both venues once and, past the threshold, quote the round trip
    /// starting on the cheaper venue.
    pub async fn check(&self) -> DexResult<Snapshot> {
        let (price_a, price_b) = try_join!(calculate_price(&self.venue_a.pair), calculate_price(&self.venue_b.pair))?;
        let difference = calculate_difference(&price_a, &price_b)?;
        debug!(%price_a, %price_b, %difference, "Prices");

        // prices are token0 per token1; flip when token_a is token1
        let direction = match ArbitrageDirection::from_difference(&difference, self.threshold)? {
            Some(direction) if self.tokens[0].sorts_before(&self.tokens[1]) => direction,
            Some(direction) => direction.opposite(),
            None => {
                return Ok(Snapshot {
                    price_a,
                    price_b,
                    difference,
                    opportunity: None,
                    trade: None,
                })
            }
        };

        let (buy_venue, sell_venue) = direction.venues(self.venue_a.dex, self.venue_b.dex);
        let (buy, sell) = match direction {
            ArbitrageDirection::StartOnA => (&self.venue_a, &self.venue_b),
            ArbitrageDirection::StartOnB => (&self.venue_b, &self.venue_a),
        };
        let estimate =
            get_cross_venue_return(self.amount_in, &buy.router, &sell.router, self.token_a(), self.token_b()).await?;

        let difference_pct = parse_difference(&difference)?;
        let opportunity = ArbitrageOpportunity {
            direction,
            buy_venue,
            sell_venue,
            token_in: self.token_a(),
            token_out: self.token_b(),
            amount_in: self.amount_in,
            difference_pct,
            estimate,
            detected_at_ms: chrono::Utc::now().timestamp_millis() as u64,
        };

        let trade = match &self.builder {
            Some(builder) if opportunity.is_profitable() => Some(builder.build_execute_trade(&TradeRequest {
                direction,
                token_in: opportunity.token_in,
                token_out: opportunity.token_out,
                amount: opportunity.amount_in,
            })),
            _ => None,
        };

        Ok(Snapshot {
            price_a,
            price_b,
            difference,
            opportunity: Some(opportunity),
            trade,
        })
    }

    fn report(&self, snapshot: &Snapshot) {
        info!(
            "{} {} | {} {} | difference {}%",
            self.venue_a.dex, snapshot.price_a, self.venue_b.dex, snapshot.price_b, snapshot.difference
        );

        let Some(opp) = &snapshot.opportunity else {
            return;
        };

        info!(
            "Buy on {} -> sell on {}: in {} out {} profit {}",
            opp.buy_venue,
            opp.sell_venue,
            opp.estimate.amount_in,
            opp.estimate.amount_out,
            opp.estimate.profit()
        );

        match &snapshot.trade {
            Some(tx) => info!(chain_id = tx.chain.chain_id(), to = %tx.to, data = ?tx.data, "executeTrade prepared"),
            None if opp.is_profitable() => debug!("No arbitrage contract configured"),
            None => warn!("Round trip is not profitable, skipping"),
        }
    }

    /// Poll every `interval` until `shutdown` fires.
    pub async fn run(&self, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        info!("Starting price monitor, polling every {:?}", interval);
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.check().await {
                        Ok(snapshot) => self.report(&snapshot),
                        Err(e) => error!("Price check failed: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    info!("Price monitor stopped");
                    break;
                }
            }
        }
    }
}

async fn open_venue<C: ChainClient>(
    client: &Arc<C>,
    settings: &Settings,
    dex: DexProtocol,
    token_a: &Token,
    token_b: &Token,
) -> DexResult<Venue<C>> {
    let addresses = settings.dex(dex)?;
    let factory = FactoryContract::new(addresses.factory, Arc::clone(client));
    let pair = get_pair_contract(&factory, token_a.address, token_b.address).await?;

    if !pair.exists() {
        return Err(DexError::InvalidConfig(format!(
            "{} has no {}/{} pair",
            dex, token_a.symbol, token_b.symbol
        )));
    }

    let reserves = get_reserves(&pair).await?;
    if reserves.is_empty() {
        return Err(DexError::InvalidConfig(format!(
            "{} {}/{} pair has no liquidity",
            dex, token_a.symbol, token_b.symbol
        )));
    }
    let (liquidity_a, liquidity_b) = reserves.oriented(token_a.address, token_b.address);
    info!(
        %dex,
        pair = %pair.address(),
        %liquidity_a,
        %liquidity_b,
        last_updated = ?reserves.last_updated(),
        "Pair resolved"
    );

    Ok(Venue {
        dex,
        router: RouterContract::new(addresses.router, Arc::clone(client)),
        pair,
    })
}
