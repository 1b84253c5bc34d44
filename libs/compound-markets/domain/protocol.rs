//! Well-known protocol addresses and constants
//!
//! The deployment indexed here has three markets that cannot be handled by
//! the general ERC20 path: the native-currency market (no `underlying()`),
//! the reference stablecoin market (the USD bridge) and the market whose
//! underlying is the legacy stable asset with broken metadata.

use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Native-currency market (cETH)
pub const NATIVE_MARKET: &str = "0x41b5844f4680a8c38fbb695b7f9cfd1f64474a72";

/// Reference stablecoin market (cUSDC)
pub const REFERENCE_MARKET: &str = "0x4a92e71227d294f041bd82dd8f78591b75140d63";

/// Underlying token of the legacy stable asset market (SAI)
pub const LEGACY_STABLE_ASSET: &str = "0x4F96Fe3b7A6Cf9725f59d353F723c1bDb64CA6Aa";

/// Comptroller (Unitroller proxy) holding the active price oracle
pub const COMPTROLLER: &str = "0x5eae89dc1c671724a672ff0630122ee834098657";

/// Decimals of the reference stablecoin
pub const REFERENCE_STABLECOIN_DECIMALS: u8 = 6;

/// Decimals assumed when an asset reports none
pub const DEFAULT_UNDERLYING_DECIMALS: u8 = 18;

/// First block served by the V2 price oracle. Everything before belongs to V1.
pub const ORACLE_V2_CUTOVER_BLOCK: u64 = 8_498_422;

pub const NATIVE_NAME: &str = "Ether";
pub const NATIVE_SYMBOL: &str = "ETH";
pub const LEGACY_STABLE_NAME: &str = "Dai Stablecoin v1.0 (DAI)";
pub const LEGACY_STABLE_SYMBOL: &str = "DAI";

/// Addresses that drive market classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolAddresses {
    pub native_market: Address,
    pub reference_market: Address,
    pub legacy_stable_asset: Address,
}

impl Default for ProtocolAddresses {
    fn default() -> Self {
        Self {
            native_market: parse_address(NATIVE_MARKET),
            reference_market: parse_address(REFERENCE_MARKET),
            legacy_stable_asset: parse_address(LEGACY_STABLE_ASSET),
        }
    }
}

pub fn default_comptroller() -> Address {
    parse_address(COMPTROLLER)
}

fn parse_address(hex: &str) -> Address {
    hex.parse().unwrap_or_else(|_| panic!("invalid built-in address {}", hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addresses_parse() {
        let addresses = ProtocolAddresses::default();
        assert_ne!(addresses.native_market, Address::zero());
        assert_ne!(addresses.reference_market, Address::zero());
        assert_ne!(addresses.legacy_stable_asset, Address::zero());
        assert_ne!(default_comptroller(), Address::zero());
        // Mixed-case constant parses to the same address as its lowercase form
        assert_eq!(
            addresses.legacy_stable_asset,
            LEGACY_STABLE_ASSET.to_lowercase().parse::<Address>().unwrap()
        );
    }
}
