//! Oracle Price Resolver
//!
//! Resolves a market's underlying price in the native currency through the
//! comptroller's active price oracle. The oracle answers with a mantissa
//! scaled by `10^(36 - underlying decimals)`.

use crate::domain::decimal::{u256_to_decimal, MANTISSA_PRECISION};
use crate::domain::protocol::REFERENCE_STABLECOIN_DECIMALS;
use crate::domain::{select_oracle, CallResult, Comptroller, PriceOracleReader, ProtocolAddresses};
use bigdecimal::BigDecimal;
use ethers::types::Address;
use num_traits::Zero;
use tracing::debug;

/// Exponent that turns an oracle answer into a native-currency price
pub fn price_exponent(underlying_decimals: u8) -> i64 {
    (MANTISSA_PRECISION - underlying_decimals as i64) + MANTISSA_PRECISION
}

/// Price lookups for a single refresh
///
/// Holds the comptroller snapshot loaded once by the caller, so every price
/// resolved through one resolver uses the same oracle.
pub struct PriceResolver<'a, C: ?Sized> {
    chain: &'a C,
    comptroller: Option<&'a Comptroller>,
    addresses: &'a ProtocolAddresses,
}

impl<'a, C: PriceOracleReader + ?Sized> PriceResolver<'a, C> {
    pub fn new(
        chain: &'a C,
        comptroller: Option<&'a Comptroller>,
        addresses: &'a ProtocolAddresses,
    ) -> Self {
        Self {
            chain,
            comptroller,
            addresses,
        }
    }

    fn active_oracle(&self) -> Option<Address> {
        self.comptroller.and_then(|c| c.price_oracle)
    }

    /// Native-currency price of one unit of `market`'s underlying asset.
    ///
    /// Zero when no oracle is configured yet.
    pub async fn asset_price_in_native(
        &self,
        market: Address,
        underlying_decimals: u8,
        block_number: u64,
    ) -> CallResult<BigDecimal> {
        let Some(oracle) = self.active_oracle() else {
            debug!("No price oracle configured, pricing {:#x} at zero", market);
            return Ok(BigDecimal::zero());
        };

        let version = select_oracle(block_number);
        let raw = self
            .chain
            .underlying_price(version, oracle, market, block_number)
            .await?;

        debug!(
            market = %format!("{:#x}", market),
            oracle = %version,
            raw = %raw,
            "Fetched underlying price"
        );

        Ok(u256_to_decimal(raw, price_exponent(underlying_decimals)))
    }

    /// Native-currency price of one reference stablecoin (USD).
    ///
    /// 0.005 means one native unit is worth 200 USD.
    pub async fn reference_price_in_native(&self, block_number: u64) -> CallResult<BigDecimal> {
        self.asset_price_in_native(
            self.addresses.reference_market,
            REFERENCE_STABLECOIN_DECIMALS,
            block_number,
        )
        .await
    }
}
