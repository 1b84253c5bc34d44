//! Refresh every configured market at the latest block.
//!
//! ```text
//! refresh_markets [config.yaml] [--watch]
//! ```
//!
//! With `--watch` the refresh repeats whenever a new block appears, until Ctrl+C.

use anyhow::{anyhow, Context, Result};
use compound_market_indexer::bin_common::{
    has_flag, interruptible_sleep, load_config_from_env, parse_args, positional_args,
    BinaryRunner, ConfigType, RunConfig,
};
use compound_markets::infrastructure::init_tracing_with;
use compound_markets::{sync_price_oracle, EthersChainReader, IndexerConfig, MarketUpdater};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::BlockNumber;
use market_db::MarketDatabase;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct RefreshApp {
    run_config: RunConfig,
    config: IndexerConfig,
    provider: Arc<Provider<Http>>,
    chain: Arc<EthersChainReader<Provider<Http>>>,
    database: Arc<MarketDatabase>,
    updater: MarketUpdater<EthersChainReader<Provider<Http>>, MarketDatabase>,
    last_block: Option<u64>,
    refreshed: usize,
    failed: usize,
}

impl RefreshApp {
    async fn new(config: IndexerConfig, watch: bool) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc.url.as_str())
            .with_context(|| format!("invalid RPC URL {}", config.rpc.url))?;
        let provider = Arc::new(provider);
        let chain = Arc::new(EthersChainReader::new(provider.clone()));
        let database = Arc::new(MarketDatabase::new(&config.database.url).await?);
        let updater = MarketUpdater::new(chain.clone(), database.clone(), config.protocol);

        let mut run_config = RunConfig::new("Compound market refresher");
        if watch {
            run_config = run_config.with_loop_interval(config.refresh.poll_interval_secs);
        }

        Ok(Self {
            run_config,
            config,
            provider,
            chain,
            database,
            updater,
            last_block: None,
            refreshed: 0,
            failed: 0,
        })
    }

    async fn latest_block(&self) -> Result<(u64, u64)> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await?
            .ok_or_else(|| anyhow!("node returned no latest block"))?;
        let number = block
            .number
            .ok_or_else(|| anyhow!("latest block has no number"))?
            .as_u64();

        Ok((number, block.timestamp.as_u64()))
    }

    /// Refresh all markets at `block_number`; a failing market does not stop the others
    async fn refresh_block(&mut self, block_number: u64, block_timestamp: u64) -> Result<()> {
        sync_price_oracle(
            self.chain.as_ref(),
            self.database.as_ref(),
            self.config.comptroller,
            block_number,
        )
        .await?;

        for &address in &self.config.markets {
            match self.updater.update_market(address, block_number, block_timestamp).await {
                Ok(market) => {
                    self.refreshed += 1;
                    info!(
                        "{:<8} block={} price_usd={} supply_rate={} borrow_rate={}",
                        market.symbol,
                        market.accrual_block_number,
                        market.underlying_price_usd,
                        market.supply_rate,
                        market.borrow_rate
                    );
                }
                Err(e) => {
                    self.failed += 1;
                    error!("Failed to refresh {:#x} at block {}: {}", address, block_number, e);
                }
            }
        }

        self.last_block = Some(block_number);
        Ok(())
    }

    async fn tick(&mut self) -> Result<()> {
        let (block_number, block_timestamp) = self.latest_block().await?;

        if self.last_block.is_some_and(|last| block_number <= last) {
            debug!("No new block (latest {})", block_number);
            return Ok(());
        }

        info!("Refreshing {} markets at block {}", self.config.markets.len(), block_number);
        self.refresh_block(block_number, block_timestamp).await
    }
}

impl BinaryRunner for RefreshApp {
    async fn run(&mut self) -> Result<()> {
        let Some(interval) = self.run_config.loop_interval_secs else {
            return self.tick().await;
        };

        loop {
            if let Err(e) = self.tick().await {
                warn!("Refresh round failed: {:#}", e);
            }

            if !interruptible_sleep(Duration::from_secs(interval)).await {
                break;
            }
        }

        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    async fn execute(&mut self) -> Result<()> {
        self.print_banner();
        let result = self.run().await;
        let stats = format!(
            "Refreshed {} markets ({} failures), last block {:?}",
            self.refreshed, self.failed, self.last_block
        );
        self.print_shutdown(Some(&stats));
        result
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = parse_args();
    let watch = has_flag(&args, "--watch");
    let config_type = match positional_args(&args).first() {
        Some(path) => ConfigType::Custom(path.to_string()),
        None => ConfigType::Indexer,
    };

    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(config_type);
    let config = IndexerConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_tracing_with(&config.log_level);
    config.log();

    let mut app = RefreshApp::new(config, watch).await?;
    app.execute().await
}
