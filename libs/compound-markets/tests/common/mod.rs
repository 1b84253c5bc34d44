//! Common test utilities for compound-markets integration tests
//!
//! `MockChain` answers every capability trait from in-memory tables and
//! counts calls, so tests can assert that a refresh did (or did not) touch
//! the chain.

#![allow(dead_code)]

use async_trait::async_trait;
use compound_markets::domain::{
    CTokenReader, CallError, CallResult, ComptrollerReader, Erc20Reader, OracleVersion,
    PriceOracleReader,
};
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Raw on-chain state of one cToken
#[derive(Debug, Clone)]
pub struct MockMarket {
    pub name: String,
    pub symbol: String,
    /// `None` for the native-currency market
    pub underlying: Option<Address>,
    pub accrual_block_number: U256,
    pub total_supply: U256,
    pub exchange_rate: U256,
    pub borrow_index: U256,
    pub total_reserves: U256,
    pub total_borrows: U256,
    pub cash: U256,
    pub supply_rate: U256,
    pub borrow_rate: U256,
}

impl MockMarket {
    pub fn new(symbol: &str, underlying: Option<Address>) -> Self {
        Self {
            name: format!("Compound {}", symbol),
            symbol: symbol.to_string(),
            underlying,
            accrual_block_number: U256::zero(),
            total_supply: U256::zero(),
            exchange_rate: U256::zero(),
            borrow_index: U256::zero(),
            total_reserves: U256::zero(),
            total_borrows: U256::zero(),
            cash: U256::zero(),
            supply_rate: U256::zero(),
            borrow_rate: U256::zero(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockAsset {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Default)]
struct MockState {
    markets: HashMap<Address, MockMarket>,
    assets: HashMap<Address, MockAsset>,
    /// Oracle answers keyed by market
    prices: HashMap<Address, U256>,
    comptroller_oracle: Address,
    oracle_calls: Vec<OracleVersion>,
    /// Error returned by every `supplyRatePerBlock()` read while set
    supply_rate_error: Option<fn(Address) -> CallError>,
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
    calls: AtomicUsize,
}

fn reverted(contract: Address, method: &'static str) -> CallError {
    CallError::Reverted { contract, method }
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_market(&self, address: Address, market: MockMarket) {
        self.state.lock().unwrap().markets.insert(address, market);
    }

    pub fn add_asset(&self, address: Address, name: &str, symbol: &str, decimals: u8) {
        self.state.lock().unwrap().assets.insert(
            address,
            MockAsset {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    pub fn set_price(&self, market: Address, raw: U256) {
        self.state.lock().unwrap().prices.insert(market, raw);
    }

    pub fn set_comptroller_oracle(&self, oracle: Address) {
        self.state.lock().unwrap().comptroller_oracle = oracle;
    }

    /// Mutate a registered market in place
    pub fn update_market(&self, address: Address, f: impl FnOnce(&mut MockMarket)) {
        let mut state = self.state.lock().unwrap();
        let market = state.markets.get_mut(&address).expect("market not registered");
        f(market);
    }

    /// Make `supplyRatePerBlock()` revert, the way some markets do on first call
    pub fn revert_supply_rate(&self) {
        self.fail_supply_rate(|market| reverted(market, "supplyRatePerBlock"));
    }

    /// Make `supplyRatePerBlock()` fail at the transport level
    pub fn break_supply_rate_transport(&self) {
        self.fail_supply_rate(|market| CallError::Provider {
            contract: market,
            method: "supplyRatePerBlock",
            reason: "connection reset by peer".to_string(),
        });
    }

    fn fail_supply_rate(&self, error: fn(Address) -> CallError) {
        self.state.lock().unwrap().supply_rate_error = Some(error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn oracle_versions(&self) -> Vec<OracleVersion> {
        self.state.lock().unwrap().oracle_calls.clone()
    }

    fn market_field<T>(
        &self,
        market: Address,
        method: &'static str,
        f: impl FnOnce(&MockMarket) -> Option<T>,
    ) -> CallResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state
            .markets
            .get(&market)
            .and_then(f)
            .ok_or_else(|| reverted(market, method))
    }

    fn asset_field<T>(
        &self,
        asset: Address,
        method: &'static str,
        f: impl FnOnce(&MockAsset) -> T,
    ) -> CallResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state.assets.get(&asset).map(f).ok_or_else(|| reverted(asset, method))
    }
}

#[async_trait]
impl CTokenReader for MockChain {
    async fn market_name(&self, market: Address, _block: u64) -> CallResult<String> {
        self.market_field(market, "name", |m| Some(m.name.clone()))
    }

    async fn market_symbol(&self, market: Address, _block: u64) -> CallResult<String> {
        self.market_field(market, "symbol", |m| Some(m.symbol.clone()))
    }

    async fn underlying(&self, market: Address, _block: u64) -> CallResult<Address> {
        self.market_field(market, "underlying", |m| m.underlying)
    }

    async fn accrual_block_number(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "accrualBlockNumber", |m| Some(m.accrual_block_number))
    }

    async fn total_supply(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "totalSupply", |m| Some(m.total_supply))
    }

    async fn exchange_rate_stored(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "exchangeRateStored", |m| Some(m.exchange_rate))
    }

    async fn borrow_index(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "borrowIndex", |m| Some(m.borrow_index))
    }

    async fn total_reserves(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "totalReserves", |m| Some(m.total_reserves))
    }

    async fn total_borrows(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "totalBorrows", |m| Some(m.total_borrows))
    }

    async fn get_cash(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "getCash", |m| Some(m.cash))
    }

    async fn supply_rate_per_block(&self, market: Address, _block: u64) -> CallResult<U256> {
        let error = self.state.lock().unwrap().supply_rate_error;
        if let Some(error) = error {
            self.calls.fetch_add(1, Ordering::SeqCst);
            return Err(error(market));
        }
        self.market_field(market, "supplyRatePerBlock", |m| Some(m.supply_rate))
    }

    async fn borrow_rate_per_block(&self, market: Address, _block: u64) -> CallResult<U256> {
        self.market_field(market, "borrowRatePerBlock", |m| Some(m.borrow_rate))
    }
}

#[async_trait]
impl Erc20Reader for MockChain {
    async fn asset_decimals(&self, asset: Address, _block: u64) -> CallResult<u8> {
        self.asset_field(asset, "decimals", |a| a.decimals)
    }

    async fn asset_name(&self, asset: Address, _block: u64) -> CallResult<String> {
        self.asset_field(asset, "name", |a| a.name.clone())
    }

    async fn asset_symbol(&self, asset: Address, _block: u64) -> CallResult<String> {
        self.asset_field(asset, "symbol", |a| a.symbol.clone())
    }
}

#[async_trait]
impl PriceOracleReader for MockChain {
    async fn underlying_price(
        &self,
        version: OracleVersion,
        _oracle: Address,
        market: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.oracle_calls.push(version);
        // Unpriced markets answer zero, like the deployed oracles
        Ok(state.prices.get(&market).copied().unwrap_or_default())
    }
}

#[async_trait]
impl ComptrollerReader for MockChain {
    async fn price_oracle(&self, _comptroller: Address, _block: u64) -> CallResult<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().comptroller_oracle)
    }
}

pub mod fixtures {
    //! Addresses and raw values shared across tests

    use super::*;
    use compound_markets::ProtocolAddresses;

    pub const ORACLE: Address = Address::repeat_byte(0x0a);
    pub const BAT_MARKET: Address = Address::repeat_byte(0xb1);
    pub const BAT_TOKEN: Address = Address::repeat_byte(0xb2);
    pub const WBTC_MARKET: Address = Address::repeat_byte(0xc1);
    pub const WBTC_TOKEN: Address = Address::repeat_byte(0xc2);
    pub const SAI_MARKET: Address = Address::repeat_byte(0xd1);
    pub const USDC_TOKEN: Address = Address::repeat_byte(0xe2);

    /// Block after the V2 oracle took over
    pub const V2_BLOCK: u64 = 9_000_000;

    pub fn addresses() -> ProtocolAddresses {
        ProtocolAddresses::default()
    }

    pub fn exp10(n: usize) -> U256 {
        U256::exp10(n)
    }

    /// 0.005 native per USD, i.e. 200 USD per native unit
    pub fn reference_price_raw() -> U256 {
        exp10(27) * 5
    }

    /// Chain with the native, reference, an 18-decimal general market, an
    /// 8-decimal general market and the legacy stable market registered.
    pub fn standard_chain() -> MockChain {
        let addresses = addresses();
        let chain = MockChain::new();

        chain.add_market(addresses.native_market, MockMarket::new("cETH", None));

        chain.add_market(addresses.reference_market, MockMarket::new("cUSDC", Some(USDC_TOKEN)));
        chain.add_asset(USDC_TOKEN, "USD Coin", "USDC", 6);

        let mut bat = MockMarket::new("cBAT", Some(BAT_TOKEN));
        bat.accrual_block_number = U256::from(101u64);
        bat.total_supply = exp10(16) * 5;
        bat.exchange_rate = exp10(26) * 2;
        bat.borrow_index = exp10(18) + exp10(16) * 3;
        bat.total_reserves = exp10(18) * 12 + 345;
        bat.total_borrows = exp10(18) * 1_000;
        bat.cash = exp10(18) * 2_500;
        bat.supply_rate = exp10(10);
        bat.borrow_rate = exp10(10) * 3;
        chain.add_market(BAT_MARKET, bat);
        chain.add_asset(BAT_TOKEN, "Basic Attention Token", "BAT", 18);

        let mut wbtc = MockMarket::new("cWBTC", Some(WBTC_TOKEN));
        wbtc.exchange_rate = exp10(16) * 2;
        wbtc.total_borrows = exp10(8) * 3;
        chain.add_market(WBTC_MARKET, wbtc);
        chain.add_asset(WBTC_TOKEN, "Wrapped BTC", "WBTC", 8);

        chain.add_market(SAI_MARKET, MockMarket::new("cSAI", Some(addresses.legacy_stable_asset)));
        // The legacy token returns bytes32 metadata that decodes to garbage
        chain.add_asset(addresses.legacy_stable_asset, "\u{0}\u{0}", "\u{0}", 18);

        chain.set_comptroller_oracle(ORACLE);
        chain
    }
}
