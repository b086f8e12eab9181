//! Signing and broadcasting over JSON-RPC.
//!
//! A [`TransactionSubmitter`] owns a signing key and pushes a prepared
//! transaction to the RPC endpoint of a given chain. It is the network half
//! of the private-key and routed-account backends; chain selection stays
//! with the adapter.

use std::future::Future;
use std::sync::Arc;

use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, TxHash};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest as RpcTransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use walletbridge::{ChainDescriptor, ChainId};

/// Errors from [`HttpSubmitter`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The chain has no RPC endpoint configured.
    #[error("no RPC endpoint configured for chain {0}")]
    MissingRpcUrl(ChainId),
    /// The endpoint serves a different chain than the transaction targets.
    #[error(
        "chain of the wallet ({wallet}) does not match the target chain. Expected Chain ID: {expected}"
    )]
    ChainMismatch {
        /// Chain reported by the endpoint.
        wallet: ChainId,
        /// Chain the transaction targets.
        expected: ChainId,
    },
    /// RPC transport or node rejection.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Signs a transaction and broadcasts it on a chain.
pub trait TransactionSubmitter: Send + Sync {
    /// Error type for submissions.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Address of the signing key, or `None` once the key is gone.
    fn address(&self) -> Option<Address>;

    /// Signs `tx` and broadcasts it through `chain`'s endpoint.
    ///
    /// Nonce, gas and fees left unset in `tx` are filled from the endpoint.
    fn submit(
        &self,
        chain: &ChainDescriptor,
        tx: RpcTransactionRequest,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;
}

impl<T: TransactionSubmitter> TransactionSubmitter for Arc<T> {
    type Error = T::Error;

    fn address(&self) -> Option<Address> {
        (**self).address()
    }

    fn submit(
        &self,
        chain: &ChainDescriptor,
        tx: RpcTransactionRequest,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send {
        (**self).submit(chain, tx)
    }
}

/// Submits through each chain's HTTP JSON-RPC endpoint with a local key.
///
/// Before sending, the endpoint's `eth_chainId` is compared with the
/// transaction's chain; a difference is reported as
/// [`SubmitError::ChainMismatch`] so the recovery driver can switch and retry.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    address: Address,
    wallet: EthereumWallet,
}

impl HttpSubmitter {
    /// Creates a submitter signing with `signer`.
    #[must_use]
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        }
    }
}

impl From<PrivateKeySigner> for HttpSubmitter {
    fn from(signer: PrivateKeySigner) -> Self {
        Self::new(signer)
    }
}

impl TransactionSubmitter for HttpSubmitter {
    type Error = SubmitError;

    fn address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn submit(
        &self,
        chain: &ChainDescriptor,
        tx: RpcTransactionRequest,
    ) -> Result<TxHash, SubmitError> {
        let rpc_url = chain
            .rpc_url
            .clone()
            .ok_or(SubmitError::MissingRpcUrl(chain.id))?;
        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(rpc_url);

        let expected = tx.chain_id.unwrap_or(chain.id);
        let wallet = provider.get_chain_id().await?;
        if wallet != expected {
            return Err(SubmitError::ChainMismatch { wallet, expected });
        }

        let tx = tx.with_from(self.address).with_chain_id(expected);
        let pending = provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(chain_id = expected, from = %self.address, tx = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RpcReply, rpc_method, test_signer};
    use alloy_primitives::address;
    use walletbridge::mismatch::{self, ErrorClass};
    use walletbridge::{NativeCurrency, TransactionRequest};
    use wiremock::{Mock, MockServer};

    fn chain(id: ChainId, rpc_url: Option<&str>) -> ChainDescriptor {
        let chain = ChainDescriptor::new(id, "Test", NativeCurrency::ether());
        match rpc_url {
            Some(url) => chain.with_rpc_url(url.parse().unwrap()),
            None => chain,
        }
    }

    fn tx(chain_id: Option<ChainId>) -> RpcTransactionRequest {
        let request = TransactionRequest::new(address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        crate::tx::to_rpc_request(&request, None, chain_id)
    }

    #[test]
    fn test_address_matches_signer() {
        let signer = test_signer();
        let expected = signer.address();
        assert_eq!(HttpSubmitter::from(signer).address(), Some(expected));
    }

    #[tokio::test]
    async fn test_missing_rpc_url() {
        let submitter = HttpSubmitter::new(test_signer());
        let err = submitter.submit(&chain(10, None), tx(None)).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingRpcUrl(10)));
    }

    #[tokio::test]
    async fn test_endpoint_on_other_chain_is_a_mismatch() {
        let server = MockServer::start().await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(RpcReply::ok("0x1"))
            .mount(&server)
            .await;

        let submitter = HttpSubmitter::new(test_signer());
        let err = submitter
            .submit(&chain(1, Some(&server.uri())), tx(Some(8453)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmitError::ChainMismatch {
                wallet: 1,
                expected: 8453
            }
        ));
        let ErrorClass::ChainMismatch(detected) = mismatch::classify(&err.to_string()) else {
            panic!("mismatch message not recognised: {err}");
        };
        assert_eq!(detected.expected, Some(8453));
    }

    #[tokio::test]
    async fn test_rpc_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(RpcReply::error(-32603, "internal error"))
            .mount(&server)
            .await;

        let submitter = HttpSubmitter::new(test_signer());
        let err = submitter
            .submit(&chain(10, Some(&server.uri())), tx(None))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
        assert!(err.to_string().contains("internal error"));
    }
}
