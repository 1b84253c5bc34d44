//! Market Record Factory
//!
//! Builds the zeroed record for a market seen for the first time. Only the
//! static identity (underlying asset, decimals, names) is read from chain.

use crate::domain::protocol::{
    DEFAULT_UNDERLYING_DECIMALS, LEGACY_STABLE_NAME, LEGACY_STABLE_SYMBOL, NATIVE_NAME,
    NATIVE_SYMBOL,
};
use crate::domain::{CTokenReader, CallResult, Erc20Reader, Market, MarketKind, ProtocolAddresses};
use bigdecimal::BigDecimal;
use ethers::types::Address;
use num_traits::One;
use tracing::info;

pub struct MarketFactory<'a, C: ?Sized> {
    chain: &'a C,
    addresses: &'a ProtocolAddresses,
}

impl<'a, C: CTokenReader + Erc20Reader + ?Sized> MarketFactory<'a, C> {
    pub fn new(chain: &'a C, addresses: &'a ProtocolAddresses) -> Self {
        Self { chain, addresses }
    }

    /// Build a new record for `address` with identity read at `block_number`
    pub async fn create_market(&self, address: Address, block_number: u64) -> CallResult<Market> {
        let mut market = if address == self.addresses.native_market {
            Self::native_market(address)
        } else {
            self.erc20_market(address, block_number).await?
        };

        market.name = self.chain.market_name(address, block_number).await?;
        market.symbol = self.chain.market_symbol(address, block_number).await?;

        info!(
            "Created market {} ({}) kind={} underlying={} decimals={}",
            market.symbol,
            market.id_hex(),
            market.kind,
            market.underlying_symbol,
            market.underlying_decimals
        );

        Ok(market)
    }

    /// The native-currency market has no `underlying()` and is priced in itself
    fn native_market(address: Address) -> Market {
        let mut market = Market::new(address, MarketKind::NativeCurrency);
        market.underlying_address = Address::zero();
        market.underlying_decimals = DEFAULT_UNDERLYING_DECIMALS;
        market.underlying_price = BigDecimal::one();
        market.underlying_name = NATIVE_NAME.to_string();
        market.underlying_symbol = NATIVE_SYMBOL.to_string();
        market
    }

    async fn erc20_market(&self, address: Address, block_number: u64) -> CallResult<Market> {
        let underlying = self.chain.underlying(address, block_number).await?;
        let kind = MarketKind::classify(address, Some(underlying), self.addresses);

        let mut market = Market::new(address, kind);
        market.underlying_address = underlying;
        market.underlying_decimals = match self.chain.asset_decimals(underlying, block_number).await? {
            0 => DEFAULT_UNDERLYING_DECIMALS,
            decimals => decimals,
        };

        if kind == MarketKind::LegacyStableAsset {
            market.underlying_name = LEGACY_STABLE_NAME.to_string();
            market.underlying_symbol = LEGACY_STABLE_SYMBOL.to_string();
        } else {
            market.underlying_name = self.chain.asset_name(underlying, block_number).await?;
            market.underlying_symbol = self.chain.asset_symbol(underlying, block_number).await?;
        }

        if kind == MarketKind::ReferenceStablecoin {
            market.underlying_price_usd = BigDecimal::one();
        }

        Ok(market)
    }
}
