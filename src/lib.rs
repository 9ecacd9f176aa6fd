//! txflow - transaction submission over a ledger node's JSON-RPC interface
//!
//! Most of this crate is a thin typed wrapper over remote procedures:
//! serialize the arguments, deserialize the response. The core is the
//! submission pipeline, which takes an application-level transaction
//! request, resolves missing pricing, broadcasts it and tracks it through
//! its asynchronous lifecycle (broadcast, inclusion, confirmations) while
//! exposing both an awaitable terminal result and per-stage lifecycle
//! events.
//!
//! ```no_run
//! use std::sync::Arc;
//! use txflow::{ClientConfig, EventTag, RpcClient, SubmitOptions, Submitter, TransactionRequest};
//!
//! # async fn example() -> txflow::ClientResult<()> {
//! let client = Arc::new(RpcClient::connect_http(ClientConfig::new(
//!     "http://localhost:8545",
//! ))?);
//! let submitter = Submitter::new(client);
//!
//! let request = TransactionRequest::new("0x...".parse().unwrap())
//!     .to("0x...".parse().unwrap())
//!     .value(1u64);
//!
//! let handle = submitter.submit(request, SubmitOptions::default());
//! handle.on(EventTag::Confirmation, |event| println!("{event:?}"));
//! let receipt = handle.result().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod rpc;
pub mod tx;

pub use config::{BlockTag, ClientConfig, SubmitOptions};
pub use error::{ClientError, ClientResult};
pub use events::{EventTag, LifecycleEvent};
pub use rpc::{BlockHeader, HttpTransport, RpcClient, RpcTransport};
pub use tx::{
    SignedTransactionBytes, SubmissionHandle, SubmitPayload, Submitter, TransactionRequest,
};
