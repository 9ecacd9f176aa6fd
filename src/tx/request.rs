//! Transaction request types and validation
//!
//! A request carries at most one pricing mode before broadcast: either a
//! legacy gas price or the fee-market pair. Requests with neither are
//! priced by the pipeline unless the caller opted out.

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// An application-level transaction request
///
/// Serializes directly into the JSON-RPC parameter object: camelCase keys,
/// unset fields omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

impl TransactionRequest {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            ..Self::default()
        }
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn gas(mut self, gas: impl Into<U256>) -> Self {
        self.gas = Some(gas.into());
        self
    }

    pub fn gas_price(mut self, price: impl Into<U256>) -> Self {
        self.gas_price = Some(price.into());
        self
    }

    pub fn fee_market(
        mut self,
        max_priority_fee: impl Into<U256>,
        max_fee: impl Into<U256>,
    ) -> Self {
        self.max_priority_fee_per_gas = Some(max_priority_fee.into());
        self.max_fee_per_gas = Some(max_fee.into());
        self
    }

    pub fn nonce(mut self, nonce: impl Into<U256>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Whether the legacy pricing mode is populated
    pub fn has_legacy_pricing(&self) -> bool {
        self.gas_price.is_some()
    }

    /// Whether the fee-market pair is completely populated
    pub fn has_fee_market_pricing(&self) -> bool {
        self.max_priority_fee_per_gas.is_some() && self.max_fee_per_gas.is_some()
    }

    /// Whether either fee-market field has been set by the caller
    pub fn has_fee_market_fields(&self) -> bool {
        self.max_priority_fee_per_gas.is_some() || self.max_fee_per_gas.is_some()
    }

    /// Whether pricing resolution is still required before broadcast
    pub fn needs_pricing(&self) -> bool {
        !self.has_legacy_pricing() && !self.has_fee_market_pricing()
    }

    /// Reject requests with both pricing modes populated.
    ///
    /// Runs before any network call; a dual-priced request is never
    /// broadcast or retried.
    pub fn validate(&self) -> ClientResult<()> {
        if self.has_legacy_pricing() && self.has_fee_market_fields() {
            return Err(ClientError::Validation(
                "gasPrice and maxPriorityFeePerGas/maxFeePerGas are mutually exclusive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// An opaque pre-signed transaction blob, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransactionBytes(Bytes);

impl SignedTransactionBytes {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

/// What a caller hands to the submission pipeline
#[derive(Debug, Clone)]
pub enum SubmitPayload {
    /// An unsigned request the node will sign; eligible for pricing
    Request(TransactionRequest),
    /// A pre-signed blob; pricing is skipped entirely
    Signed(SignedTransactionBytes),
}

impl SubmitPayload {
    pub fn is_signed(&self) -> bool {
        matches!(self, SubmitPayload::Signed(_))
    }
}

impl From<TransactionRequest> for SubmitPayload {
    fn from(request: TransactionRequest) -> Self {
        SubmitPayload::Request(request)
    }
}

impl From<SignedTransactionBytes> for SubmitPayload {
    fn from(signed: SignedTransactionBytes) -> Self {
        SubmitPayload::Signed(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_mode_predicates() {
        let bare = TransactionRequest::new(Address::zero());
        assert!(bare.needs_pricing());
        assert!(bare.validate().is_ok());

        let legacy = TransactionRequest::new(Address::zero()).gas_price(1u64);
        assert!(legacy.has_legacy_pricing());
        assert!(!legacy.needs_pricing());

        let fee_market = TransactionRequest::new(Address::zero()).fee_market(2u64, 100u64);
        assert!(fee_market.has_fee_market_pricing());
        assert!(!fee_market.needs_pricing());

        // A partial pair still needs resolution to complete it.
        let mut partial = TransactionRequest::new(Address::zero());
        partial.max_priority_fee_per_gas = Some(U256::from(2u64));
        assert!(partial.needs_pricing());
        assert!(partial.has_fee_market_fields());
    }

    #[test]
    fn dual_pricing_is_rejected() {
        let request = TransactionRequest::new(Address::zero())
            .gas_price(1u64)
            .fee_market(2u64, 100u64);
        assert!(matches!(
            request.validate(),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn serializes_as_rpc_param_object() {
        let request = TransactionRequest::new(Address::zero())
            .to(Address::repeat_byte(0xab))
            .value(1u64)
            .gas_price(1u64);

        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["value"], "0x1");
        assert_eq!(object["gasPrice"], "0x1");
        assert!(!object.contains_key("maxFeePerGas"));
        assert!(!object.contains_key("nonce"));
    }

    #[test]
    fn signed_bytes_serialize_as_hex_blob() {
        let signed = SignedTransactionBytes::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&signed).unwrap();
        assert_eq!(json, "0xdeadbeef");
    }
}
