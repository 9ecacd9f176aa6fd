//! Confirmation tracking over the block height
//!
//! Once a receipt exists, the watcher observes the chain head and reports
//! how many blocks have been produced on top of the inclusion block. The
//! count it emits is strictly increasing with no repeats and no skipped
//! values, even when the observed head jumps several blocks between
//! checks. The watcher never re-validates receipt canonicality: if the
//! chain reorganizes after the receipt was reported, the count simply
//! keeps following the node's reported head.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::events::{LifecycleEvent, ListenerTable};
use crate::rpc::RpcClient;

/// Tracks confirmations for one mined transaction
pub struct ConfirmationWatcher {
    client: Arc<RpcClient>,
    interval: Duration,
    inclusion_block: u64,
}

impl ConfirmationWatcher {
    pub fn new(client: Arc<RpcClient>, interval: Duration, inclusion_block: u64) -> Self {
        Self {
            client,
            interval,
            inclusion_block,
        }
    }

    /// Watch the chain head until cancelled or the height query fails.
    ///
    /// Emits `confirmation` once per increment. A query failure surfaces as
    /// an `error` event only, since the terminal result has already
    /// resolved, and ends the watch.
    pub async fn run(self, listeners: Arc<ListenerTable>) {
        let mut reported = 0u64;

        loop {
            match self.client.block_number().await {
                Ok(current) => {
                    let confirmations = current.saturating_sub(self.inclusion_block);
                    while reported < confirmations {
                        reported += 1;
                        debug!(
                            inclusion_block = self.inclusion_block,
                            confirmations = reported,
                            "confirmation observed"
                        );
                        listeners.emit(&LifecycleEvent::Confirmation(reported));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "confirmation watch lost its height query");
                    listeners.emit(&LifecycleEvent::Error(ClientError::Watch(e.to_string())));
                    return;
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
