//! Gas pricing resolution for unpriced transaction requests

use ethers::types::U256;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::rpc::RpcClient;
use crate::tx::request::TransactionRequest;

/// Fills unset fee fields from current network pricing
///
/// The resolver probes the latest block header for a base fee to decide
/// between fee-market and legacy pricing. Fields the caller set explicitly
/// are never overwritten. Any query failure aborts the submission before
/// broadcast; pricing is never silently skipped.
pub struct GasResolver {
    client: Arc<RpcClient>,
}

impl GasResolver {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// Populate exactly one pricing mode on a request that lacks one.
    pub async fn resolve(&self, request: &mut TransactionRequest) -> ClientResult<()> {
        if !request.needs_pricing() {
            return Ok(());
        }

        let header = self
            .client
            .latest_block()
            .await
            .map_err(|e| ClientError::Pricing(format!("base fee probe failed: {e}")))?;

        match header.and_then(|h| h.base_fee_per_gas) {
            Some(base_fee) => self.resolve_fee_market(request, base_fee).await,
            None => self.resolve_legacy(request).await,
        }
    }

    async fn resolve_fee_market(
        &self,
        request: &mut TransactionRequest,
        base_fee: U256,
    ) -> ClientResult<()> {
        let priority_fee = match request.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => {
                let fee = self
                    .client
                    .max_priority_fee_per_gas()
                    .await
                    .map_err(|e| ClientError::Pricing(format!("priority fee query failed: {e}")))?;
                request.max_priority_fee_per_gas = Some(fee);
                fee
            }
        };

        if request.max_fee_per_gas.is_none() {
            // Max fee = 2 * base fee + priority fee, headroom for base fee
            // movement across the blocks the transaction may wait in.
            request.max_fee_per_gas = Some(base_fee * 2 + priority_fee);
        }

        debug!(
            %base_fee,
            max_priority_fee = %priority_fee,
            max_fee = %request.max_fee_per_gas.unwrap_or_default(),
            "resolved fee-market pricing"
        );
        Ok(())
    }

    async fn resolve_legacy(&self, request: &mut TransactionRequest) -> ClientResult<()> {
        if request.has_fee_market_fields() {
            return Err(ClientError::Pricing(
                "request has fee-market fields but the network has no base fee".to_string(),
            ));
        }

        let price = self
            .client
            .gas_price()
            .await
            .map_err(|e| ClientError::Pricing(format!("gas price query failed: {e}")))?;
        request.gas_price = Some(price);

        debug!(gas_price = %price, "resolved legacy pricing");
        Ok(())
    }
}
