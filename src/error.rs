//! Error types for the txflow client

use thiserror::Error;

/// Main error type for client operations
///
/// Every terminal submission failure surfaces as one of these variants, both
/// through `SubmissionHandle::result` and as an `error` lifecycle event.
/// The enum is `Clone` so a resolved terminal result can be handed to any
/// number of waiters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Malformed request detected before any network call.
    #[error("invalid transaction request: {0}")]
    Validation(String),

    /// Gas pricing query failed or returned an unusable value; the
    /// submission aborts before anything reaches the network.
    #[error("gas pricing failed: {0}")]
    Pricing(String),

    /// The RPC transport failed for a reason other than "not yet
    /// available". Surfaced verbatim, never retried by this crate.
    #[error("transport error in {method}: {message}")]
    Transport { method: String, message: String },

    /// The configured polling deadline elapsed with the receipt still
    /// absent. Distinct from `Transport` so callers can re-poll with a
    /// longer deadline instead of treating it as a hard failure.
    #[error("timed out waiting for {operation} after {waited_ms}ms")]
    Timeout { operation: String, waited_ms: u64 },

    /// The confirmation watch lost its block-height query. Surfaced only
    /// as an `error` event since the terminal result has already resolved.
    #[error("confirmation watch failed: {0}")]
    Watch(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether a caller-side retry of the whole operation is reasonable.
    ///
    /// Retries are caller policy; this crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Timeout { .. } | ClientError::Watch(_))
    }

    pub(crate) fn transport(method: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Transport {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_retryable_transport_is_not() {
        let timeout = ClientError::Timeout {
            operation: "transaction receipt".to_string(),
            waited_ms: 500,
        };
        assert!(timeout.is_retryable());

        let transport = ClientError::transport("eth_sendTransaction", "connection refused");
        assert!(!transport.is_retryable());
        assert!(!ClientError::Validation("both pricing modes set".to_string()).is_retryable());
    }
}
