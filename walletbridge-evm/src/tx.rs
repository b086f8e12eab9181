//! Conversion from [`walletbridge::TransactionRequest`] to Alloy's RPC request type.

use alloy_network::TransactionBuilder;
use alloy_primitives::Address;
use alloy_rpc_types_eth::TransactionRequest as RpcTransactionRequest;
use walletbridge::{ChainId, TransactionRequest};

/// Builds the Alloy transaction request for `request`.
///
/// `chain_id` overrides the request's own chain, which lets the recovery
/// driver aim a retry at the chain recovered from a mismatch. Nonce, fees and
/// (when unset) gas are left for the backend to fill.
#[must_use]
pub fn to_rpc_request(
    request: &TransactionRequest,
    from: Option<Address>,
    chain_id: Option<ChainId>,
) -> RpcTransactionRequest {
    let mut tx = RpcTransactionRequest::default()
        .with_to(request.to)
        .with_value(request.value);
    if let Some(from) = from {
        tx = tx.with_from(from);
    }
    if let Some(data) = &request.data {
        tx = tx.with_input(data.clone());
    }
    if let Some(gas_limit) = request.gas_limit {
        tx = tx.with_gas_limit(gas_limit);
    }
    if let Some(chain_id) = chain_id {
        tx = tx.with_chain_id(chain_id);
    }
    tx
}
