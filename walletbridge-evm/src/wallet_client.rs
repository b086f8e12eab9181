//! EIP-1193 wallet client adapter.
//!
//! The wallet (a browser extension, a mobile wallet behind a relay, or any
//! JSON-RPC endpoint speaking the EIP-1193 request methods) owns the active
//! chain. Switching goes through `wallet_switchEthereumChain`; when the
//! wallet does not know the chain yet it is added from the registry with
//! `wallet_addEthereumChain` and the switch is repeated.

use std::future::Future;

use alloy_primitives::{Address, TxHash, U64};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::TransactionRequest as RpcTransactionRequest;
use alloy_transport::TransportError;
use serde::{Deserialize, Serialize};
use url::Url;
use walletbridge::mismatch;
use walletbridge::{
    ChainBackend, ChainDescriptor, ChainId, ChainRegistry, NativeCurrency, SignerAdapter,
    SignerError, TransactionRequest, send_with_chain_recovery,
};

use crate::tx::to_rpc_request;

/// A connected wallet that owns chain selection.
pub trait WalletClient: Send + Sync {
    /// Error type for wallet requests.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The connected account, if any.
    fn account(&self) -> Option<Address>;

    /// The chain the wallet was on when the client was created.
    fn chain(&self) -> Option<&ChainDescriptor>;

    /// Asks the wallet to switch to `chain_id`.
    fn switch_chain(&self, chain_id: ChainId)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Asks the wallet to add `chain`.
    fn add_chain(
        &self,
        chain: &ChainDescriptor,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Asks the wallet to sign and broadcast `tx`.
    fn send_transaction(
        &self,
        tx: RpcTransactionRequest,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;
}

/// Parameter of `wallet_switchEthereumChain` (EIP-3326).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchEthereumChainParameter {
    /// Target chain, hex encoded on the wire.
    pub chain_id: U64,
}

/// Parameter of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    /// Chain to add, hex encoded on the wire.
    pub chain_id: U64,
    /// Display name.
    pub chain_name: String,
    /// Native gas token.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    /// Block explorers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer_urls: Option<Vec<String>>,
}

impl From<&ChainDescriptor> for AddEthereumChainParameter {
    fn from(chain: &ChainDescriptor) -> Self {
        Self {
            chain_id: U64::from(chain.id),
            chain_name: chain.name.clone(),
            native_currency: chain.native_currency.clone(),
            rpc_urls: chain.rpc_url.iter().map(ToString::to_string).collect(),
            block_explorer_urls: chain
                .explorer_url
                .as_ref()
                .map(|url| vec![url.to_string()]),
        }
    }
}

/// A [`WalletClient`] speaking EIP-1193 request methods over an Alloy provider.
#[derive(Debug, Clone)]
pub struct Eip1193Client<P = RootProvider> {
    provider: P,
    account: Option<Address>,
    chain: Option<ChainDescriptor>,
}

impl Eip1193Client<RootProvider> {
    /// Connects to a wallet reachable at `url` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the wallet rejects the connection.
    pub async fn connect_http(url: Url, chains: &ChainRegistry) -> Result<Self, TransportError> {
        Self::connect(RootProvider::new_http(url), chains).await
    }
}

impl<P: Provider> Eip1193Client<P> {
    /// Creates a client from already known wallet state.
    pub const fn new(provider: P, account: Option<Address>, chain: Option<ChainDescriptor>) -> Self {
        Self {
            provider,
            account,
            chain,
        }
    }

    /// Requests account access and reads the wallet's chain.
    ///
    /// A wallet that grants no accounts yields a client without an account;
    /// a chain outside `chains` yields a client without a chain.
    ///
    /// # Errors
    ///
    /// Returns the transport error of `eth_requestAccounts` or `eth_chainId`.
    pub async fn connect(provider: P, chains: &ChainRegistry) -> Result<Self, TransportError> {
        let accounts: Vec<Address> = provider
            .raw_request("eth_requestAccounts".into(), ())
            .await?;
        let chain_id = provider.get_chain_id().await?;
        let chain = chains.by_id(chain_id).cloned();
        if chain.is_none() {
            tracing::warn!(chain_id, "Wallet is on a chain outside the registry");
        }
        tracing::debug!(account = ?accounts.first(), chain_id, "Wallet connected");
        Ok(Self::new(provider, accounts.first().copied(), chain))
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> WalletClient for Eip1193Client<P> {
    type Error = TransportError;

    fn account(&self) -> Option<Address> {
        self.account
    }

    fn chain(&self) -> Option<&ChainDescriptor> {
        self.chain.as_ref()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), TransportError> {
        let param = SwitchEthereumChainParameter {
            chain_id: U64::from(chain_id),
        };
        let _: serde_json::Value = self
            .provider
            .raw_request("wallet_switchEthereumChain".into(), (param,))
            .await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), TransportError> {
        let param = AddEthereumChainParameter::from(chain);
        let _: serde_json::Value = self
            .provider
            .raw_request("wallet_addEthereumChain".into(), (param,))
            .await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: RpcTransactionRequest) -> Result<TxHash, TransportError> {
        self.provider
            .raw_request("eth_sendTransaction".into(), (tx,))
            .await
    }
}

/// Signer adapter over a [`WalletClient`].
#[derive(Debug, Clone)]
pub struct WalletClientAdapter<C> {
    client: C,
    chains: ChainRegistry,
    block_explorer_url: Option<Url>,
}

impl<C: WalletClient> WalletClientAdapter<C> {
    /// Wraps `client`, using `chains` to add chains the wallet lacks.
    ///
    /// The block explorer is taken from the client's current chain.
    pub fn new(client: C, chains: ChainRegistry) -> Self {
        let block_explorer_url = client.chain().and_then(|chain| chain.explorer_url.clone());
        Self {
            client,
            chains,
            block_explorer_url,
        }
    }

    /// Overrides the block explorer.
    #[must_use]
    pub fn with_block_explorer_url(mut self, url: Url) -> Self {
        self.block_explorer_url = Some(url);
        self
    }

    /// The wrapped client.
    pub const fn inner(&self) -> &C {
        &self.client
    }
}

impl<C: WalletClient> ChainBackend for WalletClientAdapter<C> {
    type Error = C::Error;

    fn account(&self) -> Option<Address> {
        self.client.account()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SignerError<C::Error>> {
        let source = match self.client.switch_chain(chain_id).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if !mismatch::is_unrecognized_chain(&source.to_string()) {
            tracing::warn!(chain_id, error = %source, "Wallet rejected chain switch");
            return Err(SignerError::ChainSwitchFailed { chain_id, source });
        }

        let chain = self
            .chains
            .by_id(chain_id)
            .ok_or(SignerError::UnsupportedChain(chain_id))?;
        tracing::info!(chain_id, name = %chain.name, "Adding chain to wallet");
        self.client
            .add_chain(chain)
            .await
            .map_err(|source| SignerError::ChainSwitchFailed { chain_id, source })?;
        self.client
            .switch_chain(chain_id)
            .await
            .map_err(|source| SignerError::ChainSwitchFailed { chain_id, source })
    }

    async fn submit(
        &self,
        request: &TransactionRequest,
        chain_id: Option<ChainId>,
    ) -> Result<TxHash, C::Error> {
        let tx = to_rpc_request(request, self.client.account(), chain_id);
        self.client.send_transaction(tx).await
    }
}

impl<C: WalletClient> SignerAdapter for WalletClientAdapter<C> {
    type Error = C::Error;

    fn address(&self) -> Result<Address, SignerError<C::Error>> {
        self.client.account().ok_or(SignerError::AccountMissing)
    }

    fn block_explorer_url(&self) -> Option<&Url> {
        self.block_explorer_url.as_ref()
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHash, SignerError<C::Error>> {
        send_with_chain_recovery(self, request).await
    }
}
