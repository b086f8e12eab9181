//! Private-key signer adapter.
//!
//! A local key has no wallet UI that owns the active chain, so the adapter
//! tracks it: a switch just repoints submissions at another registry chain.

use alloy_primitives::{Address, TxHash};
use alloy_signer_local::PrivateKeySigner;
use tokio::sync::RwLock;
use url::Url;
use walletbridge::{
    ChainBackend, ChainDescriptor, ChainId, ChainRegistry, SignerAdapter, SignerError,
    TransactionRequest, send_with_chain_recovery,
};

use crate::submitter::{HttpSubmitter, TransactionSubmitter};
use crate::tx::to_rpc_request;

/// Signer adapter over a local key and a [`TransactionSubmitter`].
#[derive(Debug)]
pub struct LocalKeySigner<S = HttpSubmitter> {
    submitter: S,
    chains: ChainRegistry,
    active_chain: RwLock<ChainDescriptor>,
    block_explorer_url: Option<Url>,
}

impl LocalKeySigner<HttpSubmitter> {
    /// Creates a signer broadcasting with `signer` through each chain's RPC endpoint.
    pub fn from_signer(signer: PrivateKeySigner, chains: ChainRegistry, chain: ChainDescriptor) -> Self {
        Self::new(HttpSubmitter::new(signer), chains, chain)
    }
}

impl<S: TransactionSubmitter> LocalKeySigner<S> {
    /// Creates a signer starting on `chain`, able to switch to any of `chains`.
    ///
    /// The block explorer is the starting chain's.
    pub fn new(submitter: S, chains: ChainRegistry, chain: ChainDescriptor) -> Self {
        Self {
            submitter,
            chains,
            block_explorer_url: chain.explorer_url.clone(),
            active_chain: RwLock::new(chain),
        }
    }

    /// Overrides the block explorer.
    #[must_use]
    pub fn with_block_explorer_url(mut self, url: Url) -> Self {
        self.block_explorer_url = Some(url);
        self
    }

    /// The chain submissions currently go to.
    pub async fn active_chain_id(&self) -> ChainId {
        self.active_chain.read().await.id
    }
}

impl<S: TransactionSubmitter> ChainBackend for LocalKeySigner<S> {
    type Error = S::Error;

    fn account(&self) -> Option<Address> {
        self.submitter.address()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SignerError<S::Error>> {
        let chain = self
            .chains
            .by_id(chain_id)
            .ok_or(SignerError::UnsupportedChain(chain_id))?;
        let mut active = self.active_chain.write().await;
        if active.id != chain_id {
            tracing::debug!(from = active.id, to = chain_id, "Switching active chain");
            *active = chain.clone();
        }
        Ok(())
    }

    async fn submit(
        &self,
        request: &TransactionRequest,
        chain_id: Option<ChainId>,
    ) -> Result<TxHash, S::Error> {
        let chain = self.active_chain.read().await.clone();
        let tx = to_rpc_request(request, self.submitter.address(), chain_id);
        self.submitter.submit(&chain, tx).await
    }
}

impl<S: TransactionSubmitter> SignerAdapter for LocalKeySigner<S> {
    type Error = S::Error;

    fn address(&self) -> Result<Address, SignerError<S::Error>> {
        self.submitter.address().ok_or(SignerError::AccountMissing)
    }

    fn block_explorer_url(&self) -> Option<&Url> {
        self.block_explorer_url.as_ref()
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHash, SignerError<S::Error>> {
        send_with_chain_recovery(self, request).await
    }
}
