//! Compound contract reads over an ethers middleware
//!
//! Every read is an `eth_call` pinned to the requested block, so a refresh
//! sees one consistent chain state.
//!
//! # Usage
//!
//! ```rust,ignore
//! use compound_markets::infrastructure::EthersChainReader;
//!
//! let provider = Provider::<Http>::try_from(rpc_url)?;
//! let chain = EthersChainReader::new(Arc::new(provider));
//! let supply = chain.total_supply(market, block_number).await?;
//! ```

use crate::domain::{
    CTokenReader, CallError, CallResult, ComptrollerReader, Erc20Reader, OracleVersion,
    PriceOracleReader,
};
use async_trait::async_trait;
use ethers::abi::Detokenize;
use ethers::contract::{abigen, ContractCall, ContractError};
use ethers::prelude::*;
use std::sync::Arc;
use tracing::trace;

abigen!(
    CToken,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function underlying() external view returns (address)
        function accrualBlockNumber() external view returns (uint256)
        function totalSupply() external view returns (uint256)
        function exchangeRateStored() external view returns (uint256)
        function borrowIndex() external view returns (uint256)
        function totalReserves() external view returns (uint256)
        function totalBorrows() external view returns (uint256)
        function getCash() external view returns (uint256)
        function supplyRatePerBlock() external view returns (uint256)
        function borrowRatePerBlock() external view returns (uint256)
    ]"#
);

abigen!(
    ERC20,
    r#"[
        function decimals() external view returns (uint8)
        function name() external view returns (string)
        function symbol() external view returns (string)
    ]"#
);

abigen!(
    PriceOracle,
    r#"[
        function getUnderlyingPrice(address cToken) external view returns (uint256)
    ]"#
);

abigen!(
    PriceOracle2,
    r#"[
        function getUnderlyingPrice(address cToken) external view returns (uint256)
    ]"#
);

abigen!(
    Comptroller,
    r#"[
        function oracle() external view returns (address)
    ]"#
);

/// Chain reader backed by any ethers middleware
pub struct EthersChainReader<M> {
    client: Arc<M>,
}

impl<M: Middleware + 'static> EthersChainReader<M> {
    pub fn new(client: Arc<M>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<M> {
        &self.client
    }

    async fn read<D: Detokenize + Send + Sync>(
        &self,
        call: ContractCall<M, D>,
        contract: Address,
        method: &'static str,
        block: u64,
    ) -> CallResult<D> {
        trace!("eth_call {}() on {:#x} at block {}", method, contract, block);
        call.block(block)
            .call()
            .await
            .map_err(|e| map_contract_error(e, contract, method))
    }

    fn ctoken(&self, market: Address) -> CToken<M> {
        CToken::new(market, self.client.clone())
    }

    fn erc20(&self, asset: Address) -> ERC20<M> {
        ERC20::new(asset, self.client.clone())
    }
}

fn map_contract_error<M: Middleware>(
    error: ContractError<M>,
    contract: Address,
    method: &'static str,
) -> CallError {
    if error.is_revert() {
        CallError::Reverted { contract, method }
    } else {
        CallError::Provider {
            contract,
            method,
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> CTokenReader for EthersChainReader<M> {
    async fn market_name(&self, market: Address, block: u64) -> CallResult<String> {
        self.read(self.ctoken(market).name(), market, "name", block).await
    }

    async fn market_symbol(&self, market: Address, block: u64) -> CallResult<String> {
        self.read(self.ctoken(market).symbol(), market, "symbol", block).await
    }

    async fn underlying(&self, market: Address, block: u64) -> CallResult<Address> {
        self.read(self.ctoken(market).underlying(), market, "underlying", block).await
    }

    async fn accrual_block_number(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).accrual_block_number(), market, "accrualBlockNumber", block)
            .await
    }

    async fn total_supply(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).total_supply(), market, "totalSupply", block).await
    }

    async fn exchange_rate_stored(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).exchange_rate_stored(), market, "exchangeRateStored", block)
            .await
    }

    async fn borrow_index(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).borrow_index(), market, "borrowIndex", block).await
    }

    async fn total_reserves(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).total_reserves(), market, "totalReserves", block).await
    }

    async fn total_borrows(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).total_borrows(), market, "totalBorrows", block).await
    }

    async fn get_cash(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).get_cash(), market, "getCash", block).await
    }

    async fn supply_rate_per_block(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).supply_rate_per_block(), market, "supplyRatePerBlock", block)
            .await
    }

    async fn borrow_rate_per_block(&self, market: Address, block: u64) -> CallResult<U256> {
        self.read(self.ctoken(market).borrow_rate_per_block(), market, "borrowRatePerBlock", block)
            .await
    }
}

#[async_trait]
impl<M: Middleware + 'static> Erc20Reader for EthersChainReader<M> {
    async fn asset_decimals(&self, asset: Address, block: u64) -> CallResult<u8> {
        self.read(self.erc20(asset).decimals(), asset, "decimals", block).await
    }

    async fn asset_name(&self, asset: Address, block: u64) -> CallResult<String> {
        self.read(self.erc20(asset).name(), asset, "name", block).await
    }

    async fn asset_symbol(&self, asset: Address, block: u64) -> CallResult<String> {
        self.read(self.erc20(asset).symbol(), asset, "symbol", block).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> PriceOracleReader for EthersChainReader<M> {
    async fn underlying_price(
        &self,
        version: OracleVersion,
        oracle: Address,
        market: Address,
        block: u64,
    ) -> CallResult<U256> {
        let call = match version {
            OracleVersion::V1 => PriceOracle::new(oracle, self.client.clone()).get_underlying_price(market),
            OracleVersion::V2 => PriceOracle2::new(oracle, self.client.clone()).get_underlying_price(market),
        };
        self.read(call, oracle, "getUnderlyingPrice", block).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> ComptrollerReader for EthersChainReader<M> {
    async fn price_oracle(&self, comptroller: Address, block: u64) -> CallResult<Address> {
        self.read(
            Comptroller::new(comptroller, self.client.clone()).oracle(),
            comptroller,
            "oracle",
            block,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_encode_selectors() {
        let provider = Arc::new(Provider::<Http>::try_from("http://localhost:8545").unwrap());
        let market = Address::repeat_byte(0x11);
        let ctoken = CToken::new(market, provider.clone());

        // keccak256("exchangeRateStored()")[..4]
        let calldata = ctoken.exchange_rate_stored().calldata().unwrap();
        assert_eq!(calldata.as_ref(), &[0x18, 0x2d, 0xf0, 0xf5]);

        // keccak256("getUnderlyingPrice(address)")[..4] followed by the padded address
        let oracle = PriceOracle2::new(Address::repeat_byte(0x22), provider);
        let calldata = oracle.get_underlying_price(market).calldata().unwrap();
        assert_eq!(&calldata.as_ref()[..4], &[0xfc, 0x57, 0xd4, 0xdf]);
        assert_eq!(&calldata.as_ref()[16..36], market.as_bytes());
    }

    #[test]
    fn test_revert_maps_to_reverted() {
        let contract = Address::repeat_byte(0x33);
        let error: ContractError<Provider<Http>> = ContractError::Revert(Bytes::new());
        assert_eq!(
            map_contract_error(error, contract, "borrowRatePerBlock"),
            CallError::Reverted {
                contract,
                method: "borrowRatePerBlock"
            }
        );
    }
}
