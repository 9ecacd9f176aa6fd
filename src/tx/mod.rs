//! Transaction submission and confirmation pipeline

pub mod gas;
pub mod pipeline;
pub mod poller;
pub mod request;
pub mod watcher;

pub use gas::GasResolver;
pub use pipeline::{SubmissionHandle, Submitter};
pub use poller::ReceiptPoller;
pub use request::{SignedTransactionBytes, SubmitPayload, TransactionRequest};
pub use watcher::ConfirmationWatcher;
