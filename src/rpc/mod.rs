//! RPC transport and typed client
//!
//! The transport is a deliberately narrow seam: one named remote call with
//! positional parameters, returning a parsed result or a transport error.
//! It carries no retry logic of its own; retry policy belongs to callers.

pub mod client;

pub use client::{BlockHeader, RpcClient};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A JSON-RPC transport: named method, positional params, parsed result.
///
/// Implementations must be safe for concurrent use by many submission
/// pipelines; the trait object is shared behind an `Arc`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value>;
}

/// HTTP JSON-RPC transport backed by `ethers`
pub struct HttpTransport {
    inner: ethers::providers::Http,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let inner = config
            .url
            .parse::<ethers::providers::Http>()
            .map_err(|e| ClientError::Validation(format!("invalid endpoint URL: {e}")))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        use ethers::providers::JsonRpcClient;

        JsonRpcClient::request::<Value, Value>(&self.inner, method, params)
            .await
            .map_err(|e| ClientError::transport(method, e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for driving pipelines in tests.

    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A complete receipt response body for a transaction mined in `block`.
    pub(crate) fn receipt_json(block: u64) -> Value {
        json!({
            "transactionHash": "0x000000000000000000000000000000000000000000000000000000000000dead",
            "transactionIndex": "0x0",
            "blockHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": format!("{block:#x}"),
            "from": "0x0000000000000000000000000000000000000001",
            "to": "0x0000000000000000000000000000000000000002",
            "cumulativeGasUsed": "0x5208",
            "gasUsed": "0x5208",
            "contractAddress": null,
            "logs": [],
            "status": "0x1",
            "root": null,
            "type": "0x2",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "effectiveGasPrice": "0x1"
        })
    }

    /// A pending-shaped receipt: present, but not yet tied to a block.
    pub(crate) fn pending_receipt_json() -> Value {
        let mut receipt = receipt_json(0);
        receipt["blockNumber"] = Value::Null;
        receipt["blockHash"] = Value::Null;
        receipt
    }

    struct Scripted {
        method: String,
        delay: Duration,
        response: ClientResult<Value>,
    }

    /// Transport that replays a queue of canned responses.
    ///
    /// Each queued entry names the method it expects; a mismatch or an
    /// exhausted queue produces a transport error, which also serves as a
    /// deterministic terminator for otherwise unbounded poll loops. Entries
    /// may carry a delay, served before the response under paused time.
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn expect(&self, method: &str, response: ClientResult<Value>) {
            self.expect_after(method, Duration::ZERO, response);
        }

        pub(crate) fn expect_after(
            &self,
            method: &str,
            delay: Duration,
            response: ClientResult<Value>,
        ) {
            self.responses.lock().unwrap().push_back(Scripted {
                method: method.to_string(),
                delay,
                response,
            });
        }

        /// Methods invoked so far, in order.
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn call_count(&self, method: &str) -> usize {
            self.calls().iter().filter(|m| *m == method).count()
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn request(&self, method: &str, _params: Value) -> ClientResult<Value> {
            self.calls.lock().unwrap().push(method.to_string());
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(entry) if entry.method == method => {
                    if !entry.delay.is_zero() {
                        tokio::time::sleep(entry.delay).await;
                    }
                    entry.response
                }
                Some(entry) => Err(ClientError::transport(
                    method,
                    format!("scripted transport expected {}", entry.method),
                )),
                None => Err(ClientError::transport(method, "no scripted response")),
            }
        }
    }
}
