//! The transaction request handed to a signer adapter.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// A transaction the widget client asks the connected wallet to submit.
///
/// Built once by the caller and consumed by [`SignerAdapter::send_transaction`](crate::SignerAdapter::send_transaction).
/// The builder methods consume `self`, so a request cannot change between the
/// first submission and its retry.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::{Address, U256};
/// use walletbridge::TransactionRequest;
///
/// let request = TransactionRequest::new(Address::ZERO)
///     .with_value(U256::from(1_000u64))
///     .with_chain_id(8453);
/// assert_eq!(request.chain_id, Some(8453));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Destination address.
    pub to: Address,
    /// Calldata, if the transaction calls a contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Native value in the chain's smallest unit.
    #[serde(default)]
    pub value: U256,
    /// Explicit gas limit; estimated by the backend when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Chain the transaction must land on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
}

impl TransactionRequest {
    /// Creates a zero-value request to `to`.
    #[must_use]
    pub const fn new(to: Address) -> Self {
        Self {
            to,
            data: None,
            value: U256::ZERO,
            gas_limit: None,
            chain_id: None,
        }
    }

    /// Sets the calldata.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the native value.
    #[must_use]
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the gas limit.
    #[must_use]
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Sets the target chain.
    #[must_use]
    pub const fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_deserialize_widget_payload() {
        let json = r#"{
            "to": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "data": "0xa9059cbb",
            "value": "0x2386f26fc10000",
            "gasLimit": 21000,
            "chainId": 8453
        }"#;
        let request: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.to,
            address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
        );
        assert_eq!(request.data.as_ref().map(|b| &b[..]), Some(&[0xa9, 0x05, 0x9c, 0xbb][..]));
        assert_eq!(request.value, U256::from(10_000_000_000_000_000u64));
        assert_eq!(request.gas_limit, Some(21000));
        assert_eq!(request.chain_id, Some(8453));
    }

    #[test]
    fn test_deserialize_minimal_payload_defaults() {
        let json = r#"{ "to": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa" }"#;
        let request: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.value, U256::ZERO);
        assert!(request.data.is_none());
        assert!(request.gas_limit.is_none());
        assert!(request.chain_id.is_none());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let request = TransactionRequest::new(Address::ZERO);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("chainId").is_none());
        assert!(json.get("gasLimit").is_none());
        assert!(json.get("data").is_none());
    }
}
