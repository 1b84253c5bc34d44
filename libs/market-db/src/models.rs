//! Row types and conversions to the domain model

use crate::{DatabaseError, Result};
use bigdecimal::BigDecimal;
use chrono::Utc;
use compound_markets::{Market, MarketKind};
use ethers::types::{Address, U256};
use sqlx::FromRow;
use std::str::FromStr;

/// `markets` row
#[derive(Debug, Clone, FromRow)]
pub struct DbMarket {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub symbol: String,
    pub underlying_address: String,
    pub underlying_decimals: i64,
    pub underlying_name: String,
    pub underlying_symbol: String,
    pub exchange_rate: String,
    pub borrow_index: String,
    pub reserves: String,
    pub total_borrows: String,
    pub cash: String,
    pub total_supply: String,
    pub supply_rate: String,
    pub borrow_rate: String,
    pub collateral_factor: String,
    pub underlying_price: String,
    pub underlying_price_usd: String,
    pub accrual_block_number: i64,
    pub block_timestamp: i64,
    pub reserve_factor: String,
    pub number_of_borrowers: i64,
    pub number_of_suppliers: i64,
    pub interest_rate_model_address: String,
    pub last_updated: String,
}

/// `comptroller` row
#[derive(Debug, Clone, FromRow)]
pub struct DbComptroller {
    pub price_oracle: Option<String>,
    pub last_updated: String,
}

fn hex(address: Address) -> String {
    format!("{:#x}", address)
}

impl From<&Market> for DbMarket {
    fn from(market: &Market) -> Self {
        Self {
            id: market.id_hex(),
            kind: market.kind.as_str().to_string(),
            name: market.name.clone(),
            symbol: market.symbol.clone(),
            underlying_address: hex(market.underlying_address),
            underlying_decimals: market.underlying_decimals as i64,
            underlying_name: market.underlying_name.clone(),
            underlying_symbol: market.underlying_symbol.clone(),
            exchange_rate: market.exchange_rate.to_string(),
            borrow_index: market.borrow_index.to_string(),
            reserves: market.reserves.to_string(),
            total_borrows: market.total_borrows.to_string(),
            cash: market.cash.to_string(),
            total_supply: market.total_supply.to_string(),
            supply_rate: market.supply_rate.to_string(),
            borrow_rate: market.borrow_rate.to_string(),
            collateral_factor: market.collateral_factor.to_string(),
            underlying_price: market.underlying_price.to_string(),
            underlying_price_usd: market.underlying_price_usd.to_string(),
            // SQLite integers are signed; block numbers stay far below i64::MAX
            accrual_block_number: market.accrual_block_number as i64,
            block_timestamp: market.block_timestamp as i64,
            reserve_factor: market.reserve_factor.to_string(),
            number_of_borrowers: market.number_of_borrowers as i64,
            number_of_suppliers: market.number_of_suppliers as i64,
            interest_rate_model_address: hex(market.interest_rate_model_address),
            last_updated: Utc::now().to_rfc3339(),
        }
    }
}

/// Column parser that reports which field of which record is broken
struct RowReader<'a> {
    id: &'a str,
}

impl RowReader<'_> {
    fn corrupt(&self, field: &str, value: impl std::fmt::Display) -> DatabaseError {
        DatabaseError::CorruptRecord {
            id: self.id.to_string(),
            reason: format!("invalid {}: {}", field, value),
        }
    }

    fn address(&self, field: &str, value: &str) -> Result<Address> {
        Address::from_str(value).map_err(|_| self.corrupt(field, value))
    }

    fn decimal(&self, field: &str, value: &str) -> Result<BigDecimal> {
        BigDecimal::from_str(value).map_err(|_| self.corrupt(field, value))
    }

    fn integer<T: TryFrom<i64>>(&self, field: &str, value: i64) -> Result<T> {
        T::try_from(value).map_err(|_| self.corrupt(field, value))
    }
}

impl TryFrom<DbMarket> for Market {
    type Error = DatabaseError;

    fn try_from(row: DbMarket) -> Result<Self> {
        let r = RowReader { id: &row.id };

        Ok(Market {
            id: r.address("id", &row.id)?,
            kind: MarketKind::from_str(&row.kind).map_err(|_| r.corrupt("kind", &row.kind))?,
            name: row.name.clone(),
            symbol: row.symbol.clone(),
            underlying_address: r.address("underlying_address", &row.underlying_address)?,
            underlying_decimals: r.integer("underlying_decimals", row.underlying_decimals)?,
            underlying_name: row.underlying_name.clone(),
            underlying_symbol: row.underlying_symbol.clone(),
            exchange_rate: r.decimal("exchange_rate", &row.exchange_rate)?,
            borrow_index: r.decimal("borrow_index", &row.borrow_index)?,
            reserves: r.decimal("reserves", &row.reserves)?,
            total_borrows: r.decimal("total_borrows", &row.total_borrows)?,
            cash: r.decimal("cash", &row.cash)?,
            total_supply: r.decimal("total_supply", &row.total_supply)?,
            supply_rate: r.decimal("supply_rate", &row.supply_rate)?,
            borrow_rate: r.decimal("borrow_rate", &row.borrow_rate)?,
            collateral_factor: r.decimal("collateral_factor", &row.collateral_factor)?,
            underlying_price: r.decimal("underlying_price", &row.underlying_price)?,
            underlying_price_usd: r.decimal("underlying_price_usd", &row.underlying_price_usd)?,
            accrual_block_number: r.integer("accrual_block_number", row.accrual_block_number)?,
            block_timestamp: r.integer("block_timestamp", row.block_timestamp)?,
            reserve_factor: U256::from_dec_str(&row.reserve_factor)
                .map_err(|_| r.corrupt("reserve_factor", &row.reserve_factor))?,
            number_of_borrowers: r.integer("number_of_borrowers", row.number_of_borrowers)?,
            number_of_suppliers: r.integer("number_of_suppliers", row.number_of_suppliers)?,
            interest_rate_model_address: r
                .address("interest_rate_model_address", &row.interest_rate_model_address)?,
        })
    }
}

impl DbComptroller {
    pub fn price_oracle(&self) -> Result<Option<Address>> {
        self.price_oracle
            .as_deref()
            .map(|value| {
                Address::from_str(value).map_err(|_| DatabaseError::CorruptRecord {
                    id: "comptroller".to_string(),
                    reason: format!("invalid price_oracle: {}", value),
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_row_conversion_preserves_precision() {
        let mut market = Market::new(Address::repeat_byte(0xab), MarketKind::GeneralAsset);
        market.underlying_decimals = 8;
        market.reserves = BigDecimal::from_str("12.000000000000000345").unwrap();
        market.exchange_rate = BigDecimal::from_str("0.020000000000000001").unwrap();
        market.accrual_block_number = 9_000_000;
        market.reserve_factor = U256::exp10(17);

        let row = DbMarket::from(&market);
        assert_eq!(row.id, format!("0x{}", "ab".repeat(20)));
        assert_eq!(row.kind, "general_asset");

        let restored = Market::try_from(row).unwrap();
        assert_eq!(restored, market);
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let market = Market::new(Address::repeat_byte(0xab), MarketKind::GeneralAsset);
        let mut row = DbMarket::from(&market);
        row.cash = "not-a-number".to_string();

        match Market::try_from(row) {
            Err(DatabaseError::CorruptRecord { reason, .. }) => assert!(reason.contains("cash")),
            other => panic!("expected corrupt record, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_block_is_corrupt() {
        let market = Market::new(Address::repeat_byte(0xab), MarketKind::GeneralAsset);
        let mut row = DbMarket::from(&market);
        row.accrual_block_number = -1;

        assert!(Market::try_from(row).is_err());
    }
}
