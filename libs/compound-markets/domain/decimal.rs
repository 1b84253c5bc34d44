//! Fixed-point normalization
//!
//! On-chain values are integers carrying an implicit power-of-ten scale.
//! `to_decimal(raw, e)` recovers `raw / 10^e` exactly; truncation to a
//! field's precision happens separately and always rounds toward zero.

use bigdecimal::BigDecimal;
use ethers::types::U256;
use num_bigint::{BigInt, Sign};

/// Fractional digits of the protocol's `Exp` mantissa (rates, indexes, prices)
pub const MANTISSA_PRECISION: i64 = 18;

/// Fractional digits of a market share token (cToken)
pub const CTOKEN_DECIMALS: i64 = 8;

/// Blocks per year used to annualize per-block rates (15s blocks)
pub const BLOCKS_PER_YEAR: u64 = 2_102_400;

/// Convert a raw fixed-point integer into a decimal: `raw / 10^exponent`.
///
/// A negative exponent scales up instead of down. No precision is lost.
pub fn to_decimal(raw: impl Into<BigInt>, exponent: i64) -> BigDecimal {
    BigDecimal::new(raw.into(), exponent)
}

/// Same as [`to_decimal`] for a 256-bit word returned by a contract call
pub fn u256_to_decimal(raw: U256, exponent: i64) -> BigDecimal {
    to_decimal(u256_to_bigint(raw), exponent)
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

/// Drop every fractional digit beyond `digits` (round toward zero)
pub fn truncate(value: &BigDecimal, digits: i64) -> BigDecimal {
    value.with_scale(digits)
}

/// `10^18`
pub fn mantissa_scale() -> BigDecimal {
    to_decimal(1, -MANTISSA_PRECISION)
}

/// `10^8`
pub fn ctoken_scale() -> BigDecimal {
    to_decimal(1, -CTOKEN_DECIMALS)
}

/// Turn a per-block rate mantissa into a yearly rate with mantissa precision
pub fn annualize_rate(per_block: U256) -> BigDecimal {
    let yearly = u256_to_bigint(per_block) * BigInt::from(BLOCKS_PER_YEAR);
    truncate(&to_decimal(yearly, MANTISSA_PRECISION), MANTISSA_PRECISION)
}
