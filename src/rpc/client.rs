//! Typed JSON-RPC client
//!
//! A one-to-one mapping of remote procedure names to typed local functions:
//! serialize the arguments, deserialize the response, nothing else. The
//! client is stateless apart from read-only configuration and is safe to
//! share across concurrent submissions.

use ethers::types::{Address, TransactionReceipt, H256, U256, U64};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::format;
use crate::rpc::{HttpTransport, RpcTransport};
use crate::tx::request::{SignedTransactionBytes, TransactionRequest};

/// Minimal block header view, enough for the base-fee probe and for block
/// number bookkeeping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: Option<U64>,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
}

/// Typed client over an [`RpcTransport`]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    config: ClientConfig,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Connect over HTTP using the configured endpoint
    pub fn connect_http(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        trace!(method, %params, "rpc request");
        self.transport.request(method, params).await
    }

    /// Broadcast an unsigned transaction request for node-side signing.
    pub async fn send_transaction(&self, request: &TransactionRequest) -> ClientResult<H256> {
        let result = self
            .request("eth_sendTransaction", json!([request]))
            .await?;
        let hash: H256 = decode("eth_sendTransaction", result)?;
        debug!(tx_hash = %format::truncate_hash(&hash), "broadcast accepted");
        Ok(hash)
    }

    /// Broadcast a pre-signed transaction blob.
    pub async fn send_raw_transaction(&self, signed: &SignedTransactionBytes) -> ClientResult<H256> {
        let result = self
            .request("eth_sendRawTransaction", json!([signed]))
            .await?;
        let hash: H256 = decode("eth_sendRawTransaction", result)?;
        debug!(tx_hash = %format::truncate_hash(&hash), "raw broadcast accepted");
        Ok(hash)
    }

    /// Look up the inclusion receipt for a transaction hash.
    ///
    /// A JSON `null` means "not yet available" and is not an error.
    pub async fn transaction_receipt(
        &self,
        hash: H256,
    ) -> ClientResult<Option<TransactionReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: TransactionReceipt = decode("eth_getTransactionReceipt", result)?;
        Ok(Some(receipt))
    }

    /// Current head block number.
    pub async fn block_number(&self) -> ClientResult<u64> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        let raw = expect_string("eth_blockNumber", &result)?;
        format::parse_block_number(raw)
            .map_err(|e| ClientError::transport("eth_blockNumber", e.to_string()))
    }

    /// Latest block header, used to probe for fee-market support.
    pub async fn latest_block(&self) -> ClientResult<Option<BlockHeader>> {
        let result = self
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let header: BlockHeader = decode("eth_getBlockByNumber", result)?;
        Ok(Some(header))
    }

    /// Legacy gas price.
    pub async fn gas_price(&self) -> ClientResult<U256> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        quantity("eth_gasPrice", &result)
    }

    /// Fee-market priority fee suggestion.
    pub async fn max_priority_fee_per_gas(&self) -> ClientResult<U256> {
        let result = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
        quantity("eth_maxPriorityFeePerGas", &result)
    }

    /// Account balance at the configured default block tag.
    pub async fn balance(&self, address: Address) -> ClientResult<U256> {
        let tag = self.config.default_block_tag.as_str();
        let result = self
            .request("eth_getBalance", json!([address, tag]))
            .await?;
        quantity("eth_getBalance", &result)
    }

    /// Account nonce at the configured default block tag.
    pub async fn transaction_count(&self, address: Address) -> ClientResult<U256> {
        let tag = self.config.default_block_tag.as_str();
        let result = self
            .request("eth_getTransactionCount", json!([address, tag]))
            .await?;
        quantity("eth_getTransactionCount", &result)
    }

    /// Chain identifier of the connected node.
    pub async fn chain_id(&self) -> ClientResult<U256> {
        let result = self.request("eth_chainId", json!([])).await?;
        quantity("eth_chainId", &result)
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> ClientResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::transport(method, format!("malformed response: {e}")))
}

fn expect_string<'a>(method: &str, value: &'a Value) -> ClientResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| ClientError::transport(method, "expected a quantity string"))
}

fn quantity(method: &str, value: &Value) -> ClientResult<U256> {
    let raw = expect_string(method, value)?;
    format::parse_quantity(raw).map_err(|e| ClientError::transport(method, e.to_string()))
}
