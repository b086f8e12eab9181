//! Managed-account signer adapter.
//!
//! A managed account (an embedded or smart-account wallet) carries the
//! target chain inside each transaction and routes the submission itself.
//! The adapter therefore never switches chains: the switch step of the
//! recovery driver is a logged no-op, and a retry differs from the first
//! attempt only in the chain ID stamped on the transaction.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types_eth::TransactionRequest as RpcTransactionRequest;
use url::Url;
use walletbridge::{
    ChainBackend, ChainId, ChainRegistry, SignerAdapter, SignerError, TransactionRequest,
    send_with_chain_recovery,
};

use crate::submitter::{HttpSubmitter, TransactionSubmitter};
use crate::tx::to_rpc_request;

/// An account object that submits transactions to the chain they name.
pub trait ManagedAccount: Send + Sync {
    /// Error type for submissions.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The account address, if the account is connected.
    fn address(&self) -> Option<Address>;

    /// Submits `tx` on the chain given by `tx.chain_id`.
    fn send_transaction(
        &self,
        tx: RpcTransactionRequest,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;
}

impl<T: ManagedAccount> ManagedAccount for Arc<T> {
    type Error = T::Error;

    fn address(&self) -> Option<Address> {
        (**self).address()
    }

    fn send_transaction(
        &self,
        tx: RpcTransactionRequest,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send {
        (**self).send_transaction(tx)
    }
}

/// Errors from [`RoutedAccount`].
#[derive(Debug, thiserror::Error)]
pub enum RoutedAccountError<E> {
    /// The transaction names a chain outside the registry.
    #[error("chain {0} is not supported")]
    UnsupportedChain(ChainId),
    /// The registry is empty, so an unchained transaction has nowhere to go.
    #[error("no chains configured")]
    NoChains,
    /// The submitter failed.
    #[error(transparent)]
    Submit(E),
}

/// A [`ManagedAccount`] backed by a local key, routing each transaction to
/// the registry endpoint of its chain.
///
/// Transactions without a chain ID go to the registry's default chain.
#[derive(Debug, Clone)]
pub struct RoutedAccount<S = HttpSubmitter> {
    submitter: S,
    chains: ChainRegistry,
}

impl<S> RoutedAccount<S> {
    /// Creates an account routing through `submitter` over `chains`.
    pub const fn new(submitter: S, chains: ChainRegistry) -> Self {
        Self { submitter, chains }
    }

    /// The chains this account can route to.
    pub const fn chains(&self) -> &ChainRegistry {
        &self.chains
    }
}

impl<S: TransactionSubmitter> ManagedAccount for RoutedAccount<S> {
    type Error = RoutedAccountError<S::Error>;

    fn address(&self) -> Option<Address> {
        self.submitter.address()
    }

    async fn send_transaction(&self, tx: RpcTransactionRequest) -> Result<TxHash, Self::Error> {
        let chain = match tx.chain_id {
            Some(id) => self
                .chains
                .by_id(id)
                .ok_or(RoutedAccountError::UnsupportedChain(id))?,
            None => self
                .chains
                .default_chain()
                .ok_or(RoutedAccountError::NoChains)?,
        };
        tracing::debug!(chain_id = chain.id, "Routing transaction");
        self.submitter
            .submit(chain, tx)
            .await
            .map_err(RoutedAccountError::Submit)
    }
}

/// Signer adapter over a [`ManagedAccount`].
#[derive(Debug, Clone)]
pub struct ManagedAccountSigner<A> {
    account: A,
    block_explorer_url: Option<Url>,
}

impl<A> ManagedAccountSigner<A> {
    /// Wraps `account`.
    pub const fn new(account: A) -> Self {
        Self {
            account,
            block_explorer_url: None,
        }
    }

    /// Sets the block explorer reported by [`SignerAdapter::block_explorer_url`].
    #[must_use]
    pub fn with_block_explorer_url(mut self, url: Url) -> Self {
        self.block_explorer_url = Some(url);
        self
    }

    /// The wrapped account.
    pub const fn inner(&self) -> &A {
        &self.account
    }
}

impl<A: ManagedAccount> ChainBackend for ManagedAccountSigner<A> {
    type Error = A::Error;

    fn account(&self) -> Option<Address> {
        self.account.address()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SignerError<A::Error>> {
        tracing::debug!(chain_id, "Managed account routes by transaction chain, no switch needed");
        Ok(())
    }

    async fn submit(
        &self,
        request: &TransactionRequest,
        chain_id: Option<ChainId>,
    ) -> Result<TxHash, A::Error> {
        let tx = to_rpc_request(request, self.account.address(), chain_id);
        self.account.send_transaction(tx).await
    }
}

impl<A: ManagedAccount> SignerAdapter for ManagedAccountSigner<A> {
    type Error = A::Error;

    fn address(&self) -> Result<Address, SignerError<A::Error>> {
        self.account.address().ok_or(SignerError::AccountMissing)
    }

    fn block_explorer_url(&self) -> Option<&Url> {
        self.block_explorer_url.as_ref()
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHash, SignerError<A::Error>> {
        send_with_chain_recovery(self, request).await
    }
}
