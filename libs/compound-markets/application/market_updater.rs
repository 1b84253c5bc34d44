//! Market Refresher
//!
//! Entry point called once per market event. A market is recomputed at most
//! once per block: `accrual_block_number == block` means the record is
//! already fresh and is returned untouched.

use super::error::Result;
use super::market_factory::MarketFactory;
use super::price_resolver::PriceResolver;
use crate::domain::contracts::to_u64;
use crate::domain::decimal::{
    annualize_rate, ctoken_scale, truncate, u256_to_decimal, CTOKEN_DECIMALS, MANTISSA_PRECISION,
};
use crate::domain::{CallError, ChainReader, Market, MarketKind, MarketStore, ProtocolAddresses};
use bigdecimal::BigDecimal;
use ethers::types::Address;
use num_traits::{One, Zero};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MarketUpdater<C, S> {
    chain: Arc<C>,
    store: Arc<S>,
    addresses: ProtocolAddresses,
}

impl<C: ChainReader, S: MarketStore> MarketUpdater<C, S> {
    pub fn new(chain: Arc<C>, store: Arc<S>, addresses: ProtocolAddresses) -> Self {
        Self {
            chain,
            store,
            addresses,
        }
    }

    pub fn addresses(&self) -> &ProtocolAddresses {
        &self.addresses
    }

    /// Build (without persisting) the initial record for `address`
    pub async fn create_market(&self, address: Address, block_number: u64) -> Result<Market> {
        let factory = MarketFactory::new(self.chain.as_ref(), &self.addresses);
        Ok(factory.create_market(address, block_number).await?)
    }

    /// Load the record for `address`, creating and persisting it when missing.
    /// An existing record is never overwritten.
    pub async fn ensure_market(&self, address: Address, block_number: u64) -> Result<Market> {
        if let Some(market) = self.store.load_market(address).await? {
            return Ok(market);
        }

        let market = self.create_market(address, block_number).await?;
        self.store.save_market(&market).await?;
        Ok(market)
    }

    /// Refresh every dynamic field of `address` for `block_number`
    pub async fn update_market(
        &self,
        address: Address,
        block_number: u64,
        block_timestamp: u64,
    ) -> Result<Market> {
        let mut market = match self.store.load_market(address).await? {
            Some(market) => market,
            None => self.create_market(address, block_number).await?,
        };

        if market.is_fresh(block_number) {
            debug!("Market {} already refreshed at block {}", market.id_hex(), block_number);
            return Ok(market);
        }

        let comptroller = self.store.load_comptroller().await?;
        let resolver = PriceResolver::new(self.chain.as_ref(), comptroller.as_ref(), &self.addresses);

        self.refresh_prices(&mut market, &resolver, block_number).await?;
        self.refresh_balances(&mut market, block_number, block_timestamp).await?;
        self.refresh_rates(&mut market, block_number).await?;

        self.store.save_market(&market).await?;

        debug!(
            market = %market.id_hex(),
            block = block_number,
            accrual_block = market.accrual_block_number,
            price_usd = %market.underlying_price_usd,
            "Market refreshed"
        );

        Ok(market)
    }

    async fn refresh_prices(
        &self,
        market: &mut Market,
        resolver: &PriceResolver<'_, C>,
        block_number: u64,
    ) -> Result<()> {
        let usd_in_native = resolver.reference_price_in_native(block_number).await?;
        if usd_in_native.is_zero() {
            market.underlying_price_usd = BigDecimal::zero();
            return Ok(());
        }

        let digits = market.underlying_decimals as i64;
        match market.kind {
            MarketKind::NativeCurrency => {
                market.underlying_price = BigDecimal::one();
                market.underlying_price_usd = truncate(&(&market.underlying_price / &usd_in_native), digits);
            }
            MarketKind::ReferenceStablecoin => {
                let native = resolver
                    .asset_price_in_native(market.id, market.underlying_decimals, block_number)
                    .await?;
                market.underlying_price = truncate(&native, digits);
                market.underlying_price_usd = BigDecimal::one();
            }
            MarketKind::LegacyStableAsset | MarketKind::GeneralAsset => {
                let native = resolver
                    .asset_price_in_native(market.id, market.underlying_decimals, block_number)
                    .await?;
                market.underlying_price = truncate(&native, digits);
                market.underlying_price_usd = truncate(&(&market.underlying_price / &usd_in_native), digits);
            }
        }

        Ok(())
    }

    async fn refresh_balances(
        &self,
        market: &mut Market,
        block_number: u64,
        block_timestamp: u64,
    ) -> Result<()> {
        let id = market.id;
        let chain = self.chain.as_ref();
        let decimals = market.effective_decimals() as i64;

        let accrual = chain.accrual_block_number(id, block_number).await?;
        market.accrual_block_number = to_u64(id, "accrualBlockNumber", accrual)?;
        market.block_timestamp = block_timestamp;

        market.total_supply = u256_to_decimal(chain.total_supply(id, block_number).await?, CTOKEN_DECIMALS);

        // exchangeRateStored is underlying-per-cToken scaled by 10^(18 + decimals - 8)
        let exchange_rate = u256_to_decimal(
            chain.exchange_rate_stored(id, block_number).await?,
            decimals + MANTISSA_PRECISION,
        ) * ctoken_scale();
        market.exchange_rate = truncate(&exchange_rate, MANTISSA_PRECISION);

        market.borrow_index = truncate(
            &u256_to_decimal(chain.borrow_index(id, block_number).await?, MANTISSA_PRECISION),
            MANTISSA_PRECISION,
        );

        market.reserves = truncate(
            &u256_to_decimal(chain.total_reserves(id, block_number).await?, decimals),
            decimals,
        );
        market.total_borrows = truncate(
            &u256_to_decimal(chain.total_borrows(id, block_number).await?, decimals),
            decimals,
        );
        market.cash = truncate(
            &u256_to_decimal(chain.get_cash(id, block_number).await?, decimals),
            decimals,
        );

        Ok(())
    }

    async fn refresh_rates(&self, market: &mut Market, block_number: u64) -> Result<()> {
        let chain = self.chain.as_ref();

        // Field mapping is crossed against the contract getters, as indexed historically
        market.supply_rate = annualize_rate(chain.borrow_rate_per_block(market.id, block_number).await?);

        // Reverts on the first call for some markets; only a revert is recorded as zero
        market.borrow_rate = match chain.supply_rate_per_block(market.id, block_number).await {
            Ok(per_block) => annualize_rate(per_block),
            Err(e @ CallError::Reverted { .. }) => {
                warn!(
                    market = %market.id_hex(),
                    block = block_number,
                    error = %e,
                    "supplyRatePerBlock() reverted, recording zero"
                );
                BigDecimal::zero()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(())
    }
}
