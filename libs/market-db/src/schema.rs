use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Database schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    // Decimals are stored as TEXT to keep full precision
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS markets (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            symbol TEXT NOT NULL,
            underlying_address TEXT NOT NULL,
            underlying_decimals INTEGER NOT NULL,
            underlying_name TEXT NOT NULL,
            underlying_symbol TEXT NOT NULL,
            exchange_rate TEXT NOT NULL,
            borrow_index TEXT NOT NULL,
            reserves TEXT NOT NULL,
            total_borrows TEXT NOT NULL,
            cash TEXT NOT NULL,
            total_supply TEXT NOT NULL,
            supply_rate TEXT NOT NULL,
            borrow_rate TEXT NOT NULL,
            collateral_factor TEXT NOT NULL,
            underlying_price TEXT NOT NULL,
            underlying_price_usd TEXT NOT NULL,
            accrual_block_number INTEGER NOT NULL,
            block_timestamp INTEGER NOT NULL,
            reserve_factor TEXT NOT NULL,
            number_of_borrowers INTEGER NOT NULL DEFAULT 0,
            number_of_suppliers INTEGER NOT NULL DEFAULT 0,
            interest_rate_model_address TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_markets_symbol ON markets(symbol)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_markets_accrual ON markets(accrual_block_number)")
        .execute(pool)
        .await?;

    // Single-row table: the comptroller is a singleton
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comptroller (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            price_oracle TEXT,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
    )
    .bind(SCHEMA_VERSION)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get current schema version
pub async fn get_schema_version(pool: &SqlitePool) -> Result<Option<i32>> {
    let row = sqlx::query_as::<_, (i32,)>("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(version,)| version))
}
