//! Transaction submission pipeline
//!
//! Drives one transaction from request to confirmed receipt: resolves
//! missing pricing, broadcasts, polls for the inclusion receipt, then
//! tracks confirmations, exposing both a single awaitable terminal result
//! and a stream of lifecycle notifications.
//!
//! The dual contract is an explicit listener table consulted at emission
//! time plus a terminal cell resolved exactly once. The driver runs on a
//! spawned task that stays parked until the handle releases it, via
//! [`SubmissionHandle::start`] or the first [`SubmissionHandle::result`]
//! await. No event can fire before that release, so listeners attached
//! between `submit` and the release never miss one, on any runtime
//! flavor.

use ethers::types::TransactionReceipt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SubmitOptions;
use crate::error::{ClientError, ClientResult};
use crate::events::{EventTag, LifecycleEvent, ListenerTable};
use crate::format;
use crate::rpc::RpcClient;
use crate::tx::gas::GasResolver;
use crate::tx::poller::ReceiptPoller;
use crate::tx::request::SubmitPayload;
use crate::tx::watcher::ConfirmationWatcher;

type Terminal = Option<ClientResult<TransactionReceipt>>;

enum WatchSlot {
    Idle,
    Running(JoinHandle<()>),
    Cancelled,
}

/// State shared between the driver task, the watcher task and the handle.
///
/// Owned per submission; nothing here is shared across concurrent
/// submissions except the client itself.
struct Shared {
    client: Arc<RpcClient>,
    listeners: Arc<ListenerTable>,
    terminal: watch::Sender<Terminal>,
    confirmation_interval: Duration,
    mined_block: Mutex<Option<u64>>,
    watch_slot: Mutex<WatchSlot>,
}

impl Shared {
    fn emit(&self, event: LifecycleEvent) {
        debug!(event = event.name(), "lifecycle event");
        self.listeners.emit(&event);
    }

    /// Resolve the terminal result; later calls are ignored.
    fn resolve(&self, result: ClientResult<TransactionReceipt>) {
        self.terminal.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(result);
                true
            } else {
                false
            }
        });
    }

    fn fail(&self, error: ClientError) {
        warn!(error = %error, "submission failed");
        self.emit(LifecycleEvent::Error(error.clone()));
        self.resolve(Err(error));
    }

    fn mark_mined(&self, block: u64) {
        *self.mined_block.lock().expect("mined block poisoned") = Some(block);
    }

    /// Start the confirmation watch if the receipt is known, a watch is not
    /// already running and the watch has not been cancelled.
    fn maybe_start_watch(&self) {
        let inclusion_block = match *self.mined_block.lock().expect("mined block poisoned") {
            Some(block) => block,
            None => return,
        };
        let mut slot = self.watch_slot.lock().expect("watch slot poisoned");
        if !matches!(*slot, WatchSlot::Idle) {
            return;
        }
        let watcher = ConfirmationWatcher::new(
            self.client.clone(),
            self.confirmation_interval,
            inclusion_block,
        );
        *slot = WatchSlot::Running(tokio::spawn(watcher.run(self.listeners.clone())));
    }

    /// Stop the confirmation watch permanently. Cancellation never
    /// retroactively fails a result that has already resolved.
    fn cancel_watch(&self) {
        let mut slot = self.watch_slot.lock().expect("watch slot poisoned");
        if let WatchSlot::Running(task) = &*slot {
            task.abort();
        }
        *slot = WatchSlot::Cancelled;
    }
}

/// Entry point for transaction submissions
///
/// Cheap to construct; the client behind it is stateless and safe to share
/// across any number of submitters and concurrent submissions. Must be used
/// from within a tokio runtime.
pub struct Submitter {
    client: Arc<RpcClient>,
}

impl Submitter {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// Submit a transaction and return its lifecycle handle.
    ///
    /// Returns immediately with nothing on the wire yet: the spawned
    /// driver task stays parked until the handle starts it, so listeners
    /// attached before then observe the full lifecycle.
    pub fn submit(
        &self,
        payload: impl Into<SubmitPayload>,
        options: SubmitOptions,
    ) -> SubmissionHandle {
        let (terminal, terminal_rx) = watch::channel(None);
        let (starter, start) = oneshot::channel();
        let shared = Arc::new(Shared {
            client: self.client.clone(),
            listeners: Arc::new(ListenerTable::new()),
            terminal,
            confirmation_interval: options.confirmation_poll_interval(),
            mined_block: Mutex::new(None),
            watch_slot: Mutex::new(WatchSlot::Idle),
        });

        tokio::spawn(drive(shared.clone(), payload.into(), options, start));

        SubmissionHandle {
            shared,
            terminal: terminal_rx,
            starter: Mutex::new(Some(starter)),
        }
    }
}

/// The driver: one run through the submission state machine.
///
/// Parked on the start signal first; a dropped sender means the handle was
/// discarded before starting and the submission is abandoned untouched.
async fn drive(
    shared: Arc<Shared>,
    mut payload: SubmitPayload,
    options: SubmitOptions,
    start: oneshot::Receiver<()>,
) {
    if start.await.is_err() {
        debug!("submission handle dropped before start, nothing sent");
        return;
    }

    // PRICING: unsigned requests only, unless the caller opted out or
    // already supplied a complete pricing mode.
    if let SubmitPayload::Request(request) = &mut payload {
        if let Err(e) = request.validate() {
            shared.fail(e);
            return;
        }
        if !options.skip_pricing && request.needs_pricing() {
            let resolver = GasResolver::new(shared.client.clone());
            if let Err(e) = resolver.resolve(request).await {
                shared.fail(e);
                return;
            }
        }
    }

    // The payload is fully formatted from here on.
    shared.emit(LifecycleEvent::Sending(payload.clone()));

    // BROADCASTING: a failure here is fatal to this submission; retries
    // are caller policy.
    let broadcast = match &payload {
        SubmitPayload::Request(request) => shared.client.send_transaction(request).await,
        SubmitPayload::Signed(signed) => shared.client.send_raw_transaction(signed).await,
    };
    let hash = match broadcast {
        Ok(hash) => hash,
        Err(e) => {
            shared.fail(e);
            return;
        }
    };
    info!(tx_hash = %format::truncate_hash(&hash), "transaction broadcast");
    shared.emit(LifecycleEvent::Sent(payload));
    shared.emit(LifecycleEvent::TransactionHash(hash));

    // POLLING_RECEIPT
    let poller = ReceiptPoller::new(
        shared.client.clone(),
        options.poll_interval(),
        options.poll_timeout(),
    );
    let receipt = match poller.poll(hash).await {
        Ok(receipt) => receipt,
        Err(e) => {
            shared.fail(e);
            return;
        }
    };

    // MINED: emit the receipt and resolve the terminal result exactly once.
    // The poller only returns included receipts, so the block is known and
    // the confirmation baseline is never a guess.
    if let Some(block) = receipt.block_number {
        shared.mark_mined(block.as_u64());
    }
    shared.emit(LifecycleEvent::Receipt(receipt.clone()));
    shared.resolve(Ok(receipt));

    // WATCHING_CONFIRMATIONS, only for interested callers.
    if shared.listeners.has(EventTag::Confirmation) {
        shared.maybe_start_watch();
    }
}

/// Handle to one in-flight submission
///
/// Supports awaiting the terminal result and registering listeners for any
/// lifecycle tag at any point in the submission's life. Events that fired
/// before a listener was attached are not redelivered; listeners attached
/// before the submission is started cannot miss any. Dropping a started
/// handle stops the confirmation watch but never recalls an in-flight
/// broadcast; dropping a never-started handle abandons the submission
/// before anything reaches the network.
pub struct SubmissionHandle {
    shared: Arc<Shared>,
    terminal: watch::Receiver<Terminal>,
    starter: Mutex<Option<oneshot::Sender<()>>>,
}

impl SubmissionHandle {
    /// Release the parked driver. Idempotent; also performed by the first
    /// [`result`](Self::result) await.
    pub fn start(&self) {
        if let Some(starter) = self.starter.lock().expect("starter poisoned").take() {
            let _ = starter.send(());
        }
    }

    /// Register a listener for one lifecycle tag.
    ///
    /// Attaching the first `Confirmation` listener after the receipt is
    /// known starts the confirmation watch, unless it was cancelled.
    pub fn on<F>(&self, tag: EventTag, listener: F)
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.register(tag, Arc::new(listener));
        if tag == EventTag::Confirmation {
            self.shared.maybe_start_watch();
        }
    }

    /// Await the terminal result: the inclusion receipt, or the error that
    /// ended the submission. Starts the driver if nothing has yet.
    pub async fn result(&self) -> ClientResult<TransactionReceipt> {
        self.start();
        let mut terminal = self.terminal.clone();
        loop {
            let resolved = terminal.borrow_and_update().clone();
            if let Some(result) = resolved {
                return result;
            }
            if terminal.changed().await.is_err() {
                return Err(ClientError::Internal(
                    "submission task ended before resolving".to_string(),
                ));
            }
        }
    }

    /// Stop confirmation tracking permanently.
    pub fn cancel_confirmations(&self) {
        self.shared.cancel_watch();
    }
}

impl Drop for SubmissionHandle {
    fn drop(&mut self) {
        self.shared.cancel_watch();
    }
}
