pub mod models;
pub mod schema;

use async_trait::async_trait;
use chrono::Utc;
use compound_markets::domain::{MarketStore, StoreError, StoreResult};
use compound_markets::{Comptroller, Market};
use ethers::types::Address;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

// Re-export main types
pub use models::{DbComptroller, DbMarket};
pub use schema::{get_schema_version, initialize_schema};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    SchemaError(#[from] schema::SchemaError),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Market not found: {0}")]
    MarketNotFound(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::CorruptRecord { id, reason } => StoreError::Corrupt { id, reason },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Market database manager
pub struct MarketDatabase {
    pool: SqlitePool,
}

impl MarketDatabase {
    /// Create new database connection and initialize schema
    pub async fn new(db_path: &str) -> Result<Self> {
        info!("Connecting to database: {}", db_path);

        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await?;

        schema::initialize_schema(&pool).await?;

        info!("Database initialized successfully");

        Ok(Self { pool })
    }

    // ==================== MARKET OPERATIONS ====================

    /// Insert a market (or replace if exists)
    pub async fn upsert_market(&self, market: &Market) -> Result<()> {
        let row = DbMarket::from(market);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO markets (
                id, kind, name, symbol, underlying_address, underlying_decimals,
                underlying_name, underlying_symbol, exchange_rate, borrow_index, reserves,
                total_borrows, cash, total_supply, supply_rate, borrow_rate,
                collateral_factor, underlying_price, underlying_price_usd,
                accrual_block_number, block_timestamp, reserve_factor,
                number_of_borrowers, number_of_suppliers, interest_rate_model_address,
                last_updated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.kind)
        .bind(&row.name)
        .bind(&row.symbol)
        .bind(&row.underlying_address)
        .bind(row.underlying_decimals)
        .bind(&row.underlying_name)
        .bind(&row.underlying_symbol)
        .bind(&row.exchange_rate)
        .bind(&row.borrow_index)
        .bind(&row.reserves)
        .bind(&row.total_borrows)
        .bind(&row.cash)
        .bind(&row.total_supply)
        .bind(&row.supply_rate)
        .bind(&row.borrow_rate)
        .bind(&row.collateral_factor)
        .bind(&row.underlying_price)
        .bind(&row.underlying_price_usd)
        .bind(row.accrual_block_number)
        .bind(row.block_timestamp)
        .bind(&row.reserve_factor)
        .bind(row.number_of_borrowers)
        .bind(row.number_of_suppliers)
        .bind(&row.interest_rate_model_address)
        .bind(&row.last_updated)
        .execute(&self.pool)
        .await?;

        debug!("Upserted market {} at block {}", row.id, row.accrual_block_number);
        Ok(())
    }

    /// Get market by address, `None` when it was never stored
    pub async fn find_market(&self, id: Address) -> Result<Option<Market>> {
        let row = sqlx::query_as::<_, DbMarket>("SELECT * FROM markets WHERE id = ?")
            .bind(format!("{:#x}", id))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Market::try_from).transpose()
    }

    /// Get market by address
    pub async fn get_market(&self, id: Address) -> Result<Market> {
        self.find_market(id)
            .await?
            .ok_or_else(|| DatabaseError::MarketNotFound(format!("{:#x}", id)))
    }

    /// Get all markets ordered by symbol
    pub async fn get_markets(&self) -> Result<Vec<Market>> {
        let rows = sqlx::query_as::<_, DbMarket>("SELECT * FROM markets ORDER BY symbol ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Market::try_from).collect()
    }

    /// Get total number of markets
    pub async fn market_count(&self) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM markets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // ==================== COMPTROLLER OPERATIONS ====================

    pub async fn get_comptroller(&self) -> Result<Option<Comptroller>> {
        let row = sqlx::query_as::<_, DbComptroller>(
            "SELECT price_oracle, last_updated FROM comptroller WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Comptroller {
                price_oracle: row.price_oracle()?,
            })),
            None => Ok(None),
        }
    }

    pub async fn upsert_comptroller(&self, comptroller: &Comptroller) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO comptroller (id, price_oracle, last_updated) VALUES (1, ?, ?)",
        )
        .bind(comptroller.price_oracle.map(|oracle| format!("{:#x}", oracle)))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== UTILITY ====================

    /// Get database pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MarketStore for MarketDatabase {
    async fn load_market(&self, id: Address) -> StoreResult<Option<Market>> {
        Ok(self.find_market(id).await?)
    }

    async fn save_market(&self, market: &Market) -> StoreResult<()> {
        Ok(self.upsert_market(market).await?)
    }

    async fn load_comptroller(&self) -> StoreResult<Option<Comptroller>> {
        Ok(self.get_comptroller().await?)
    }

    async fn save_comptroller(&self, comptroller: &Comptroller) -> StoreResult<()> {
        Ok(self.upsert_comptroller(comptroller).await?)
    }
}
