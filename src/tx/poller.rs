//! Receipt polling with a configurable interval and deadline

use ethers::types::{TransactionReceipt, H256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::format;
use crate::rpc::RpcClient;

/// Polls for a transaction's inclusion receipt until found or the deadline
/// passes
///
/// An absent receipt is not an error and triggers the next attempt, as is
/// a pending-shaped receipt some nodes return before inclusion (present
/// but with no block number). Any other transport failure is forwarded
/// immediately with no further polling. Interval and deadline come from
/// the caller so tests can use short values.
pub struct ReceiptPoller {
    client: Arc<RpcClient>,
    interval: Duration,
    timeout: Duration,
}

impl ReceiptPoller {
    pub fn new(client: Arc<RpcClient>, interval: Duration, timeout: Duration) -> Self {
        Self {
            client,
            interval,
            timeout,
        }
    }

    /// Poll until an included receipt appears or the deadline is exhausted.
    ///
    /// The returned receipt always carries a block number.
    pub async fn poll(&self, hash: H256) -> ClientResult<TransactionReceipt> {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.client.transaction_receipt(hash).await? {
                Some(receipt) if receipt.block_number.is_some() => {
                    debug!(
                        tx_hash = %format::truncate_hash(&hash),
                        attempt,
                        block = receipt.block_number.map(|b| b.as_u64()).unwrap_or_default(),
                        "receipt found"
                    );
                    return Ok(receipt);
                }
                Some(_) => {
                    debug!(
                        tx_hash = %format::truncate_hash(&hash),
                        attempt,
                        "receipt present but not yet included"
                    );
                }
                None => {
                    debug!(
                        tx_hash = %format::truncate_hash(&hash),
                        attempt,
                        "receipt not yet available"
                    );
                }
            }

            if started.elapsed() + self.interval > self.timeout {
                warn!(
                    tx_hash = %format::truncate_hash(&hash),
                    attempts = attempt,
                    "receipt polling deadline exhausted"
                );
                return Err(ClientError::Timeout {
                    operation: "transaction receipt".to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }

            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::rpc::testing::{pending_receipt_json, receipt_json, ScriptedTransport};
    use serde_json::Value;

    fn poller(
        transport: Arc<ScriptedTransport>,
        interval_ms: u64,
        timeout_ms: u64,
    ) -> ReceiptPoller {
        let client = Arc::new(RpcClient::new(transport, ClientConfig::default()));
        ReceiptPoller::new(
            client,
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn returns_receipt_after_null_attempts() {
        let transport = ScriptedTransport::new();
        transport.expect("eth_getTransactionReceipt", Ok(Value::Null));
        transport.expect("eth_getTransactionReceipt", Ok(Value::Null));
        transport.expect("eth_getTransactionReceipt", Ok(receipt_json(10)));

        let receipt = poller(transport.clone(), 10, 1_000)
            .poll(H256::zero())
            .await
            .unwrap();

        assert_eq!(receipt.block_number.unwrap().as_u64(), 10);
        assert_eq!(transport.call_count("eth_getTransactionReceipt"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_shaped_receipt_triggers_another_attempt() {
        let transport = ScriptedTransport::new();
        transport.expect("eth_getTransactionReceipt", Ok(pending_receipt_json()));
        transport.expect("eth_getTransactionReceipt", Ok(receipt_json(12)));

        let receipt = poller(transport.clone(), 10, 1_000)
            .poll(H256::zero())
            .await
            .unwrap();

        // A receipt with no block number is not an inclusion.
        assert_eq!(receipt.block_number.unwrap().as_u64(), 12);
        assert_eq!(transport.call_count("eth_getTransactionReceipt"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_deadline_is_timeout_not_transport() {
        let transport = ScriptedTransport::new();
        for _ in 0..10 {
            transport.expect("eth_getTransactionReceipt", Ok(Value::Null));
        }

        let err = poller(transport, 10, 45).poll(H256::zero()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_stops_polling_immediately() {
        let transport = ScriptedTransport::new();
        transport.expect("eth_getTransactionReceipt", Ok(Value::Null));
        transport.expect(
            "eth_getTransactionReceipt",
            Err(ClientError::transport(
                "eth_getTransactionReceipt",
                "execution reverted",
            )),
        );

        let err = poller(transport.clone(), 10, 1_000)
            .poll(H256::zero())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::transport("eth_getTransactionReceipt", "execution reverted")
        );
        // No retry after a real error.
        assert_eq!(transport.call_count("eth_getTransactionReceipt"), 2);
    }
}
