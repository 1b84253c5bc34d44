//! Market record and its classification

use super::protocol::ProtocolAddresses;
use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// How a market's asset identity and prices are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    /// Market over the chain's native currency; priced in itself
    NativeCurrency,
    /// Market over the stablecoin that bridges native and USD prices
    ReferenceStablecoin,
    /// ERC20 market whose underlying reports unusable metadata
    LegacyStableAsset,
    /// Every other ERC20 market
    GeneralAsset,
}

impl MarketKind {
    /// Classify a market from its address and, for ERC20 markets, its underlying
    pub fn classify(market: Address, underlying: Option<Address>, addresses: &ProtocolAddresses) -> Self {
        if market == addresses.native_market {
            MarketKind::NativeCurrency
        } else if market == addresses.reference_market {
            MarketKind::ReferenceStablecoin
        } else if underlying == Some(addresses.legacy_stable_asset) {
            MarketKind::LegacyStableAsset
        } else {
            MarketKind::GeneralAsset
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::NativeCurrency => "native_currency",
            MarketKind::ReferenceStablecoin => "reference_stablecoin",
            MarketKind::LegacyStableAsset => "legacy_stable_asset",
            MarketKind::GeneralAsset => "general_asset",
        }
    }
}

impl std::fmt::Display for MarketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MarketKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native_currency" => Ok(MarketKind::NativeCurrency),
            "reference_stablecoin" => Ok(MarketKind::ReferenceStablecoin),
            "legacy_stable_asset" => Ok(MarketKind::LegacyStableAsset),
            "general_asset" => Ok(MarketKind::GeneralAsset),
            other => Err(format!("unknown market kind: {}", other)),
        }
    }
}

/// Normalized snapshot of one lending market
///
/// Decimal fields hold human units (already divided by their on-chain scale).
/// `accrual_block_number` doubles as the freshness marker: a market is fresh
/// for block `n` once it equals `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: Address,
    pub kind: MarketKind,
    pub name: String,
    pub symbol: String,

    pub underlying_address: Address,
    pub underlying_decimals: u8,
    pub underlying_name: String,
    pub underlying_symbol: String,

    pub exchange_rate: BigDecimal,
    pub borrow_index: BigDecimal,
    pub reserves: BigDecimal,
    pub total_borrows: BigDecimal,
    pub cash: BigDecimal,
    pub total_supply: BigDecimal,
    pub supply_rate: BigDecimal,
    pub borrow_rate: BigDecimal,
    pub collateral_factor: BigDecimal,
    /// Price of one underlying unit in the native currency
    pub underlying_price: BigDecimal,
    /// Price of one underlying unit in USD
    pub underlying_price_usd: BigDecimal,

    pub accrual_block_number: u64,
    pub block_timestamp: u64,
    pub reserve_factor: U256,
    pub number_of_borrowers: u32,
    pub number_of_suppliers: u32,
    pub interest_rate_model_address: Address,
}

impl Market {
    /// Zeroed record; identity strings are filled in by the factory
    pub fn new(id: Address, kind: MarketKind) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            symbol: String::new(),
            underlying_address: Address::zero(),
            underlying_decimals: 0,
            underlying_name: String::new(),
            underlying_symbol: String::new(),
            exchange_rate: BigDecimal::zero(),
            borrow_index: BigDecimal::zero(),
            reserves: BigDecimal::zero(),
            total_borrows: BigDecimal::zero(),
            cash: BigDecimal::zero(),
            total_supply: BigDecimal::zero(),
            supply_rate: BigDecimal::zero(),
            borrow_rate: BigDecimal::zero(),
            collateral_factor: BigDecimal::zero(),
            underlying_price: BigDecimal::zero(),
            underlying_price_usd: BigDecimal::zero(),
            accrual_block_number: 0,
            block_timestamp: 0,
            reserve_factor: U256::zero(),
            number_of_borrowers: 0,
            number_of_suppliers: 0,
            interest_rate_model_address: Address::zero(),
        }
    }

    /// Record id as stored: lowercase 0x-prefixed hex
    pub fn id_hex(&self) -> String {
        format!("{:#x}", self.id)
    }

    /// Whether dynamic fields were already recomputed for `block_number`
    pub fn is_fresh(&self, block_number: u64) -> bool {
        self.accrual_block_number == block_number
    }

    /// Decimals used for scaling asset amounts (never zero)
    pub fn effective_decimals(&self) -> u8 {
        if self.underlying_decimals == 0 {
            super::protocol::DEFAULT_UNDERLYING_DECIMALS
        } else {
            self.underlying_decimals
        }
    }
}

/// Global protocol settings kept as a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comptroller {
    pub price_oracle: Option<Address>,
}

impl Comptroller {
    pub fn with_oracle(oracle: Address) -> Self {
        Self {
            price_oracle: Some(oracle),
        }
    }
}
