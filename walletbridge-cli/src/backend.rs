//! Backend composition.
//!
//! The harness picks one signer adapter from configuration and drives it
//! through the backend-agnostic [`SignerAdapter`] surface, the way a widget
//! client would.

use alloy_primitives::{Address, TxHash};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use url::Url;
use walletbridge::{
    ChainRegistry, SignerAdapter, SignerError, TransactionRequest, WalletConnection,
};
use walletbridge_evm::{
    ConnectedSubmitter, ConnectorError, Eip1193Client, HttpSubmitter, LocalKeySigner,
    ManagedAccountSigner, PrivateKeyConnector, RoutedAccount, RoutedAccountError, SubmitError,
    WalletClientAdapter,
};

use crate::config::{Backend, ConfigError, WalletConfig};

/// Errors from composing a backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The backend needs a private key and none is configured.
    #[error("private_key is required for the {0:?} backend")]
    MissingPrivateKey(Backend),
    /// The private-key connector rejected the key or chain.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    /// The wallet endpoint could not be reached.
    #[error(transparent)]
    Wallet(#[from] TransportError),
}

/// The backend error carried by [`ConfiguredSigner`].
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// From the private-key backend.
    #[error(transparent)]
    LocalKey(ConnectorError),
    /// From the managed-account backend.
    #[error(transparent)]
    Managed(RoutedAccountError<SubmitError>),
    /// From the EIP-1193 backend.
    #[error(transparent)]
    Eip1193(TransportError),
}

/// The signer adapter selected by configuration.
#[derive(Debug)]
pub enum ConfiguredSigner {
    /// Private key held by a connector the harness owns.
    LocalKey(LocalKeySigner<ConnectedSubmitter>),
    /// Private key behind a chain-routing account.
    Managed(ManagedAccountSigner<RoutedAccount<HttpSubmitter>>),
    /// External EIP-1193 wallet.
    Eip1193(WalletClientAdapter<Eip1193Client>),
}

impl ConfiguredSigner {
    /// Builds the adapter for `config.backend` over `chains`.
    ///
    /// The private-key backend goes through a [`PrivateKeyConnector`]
    /// connected on the registry's default chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend's key or endpoint is missing or
    /// invalid, or if the wallet cannot be reached.
    pub async fn from_config(
        config: &WalletConfig,
        chains: ChainRegistry,
    ) -> Result<Self, BackendError> {
        match config.backend {
            Backend::LocalKey => {
                let connector = connect_private_key(config, chains).await?;
                Ok(Self::LocalKey(connector.signer(None).await?))
            }
            Backend::Managed => {
                let key = config
                    .private_key()
                    .ok_or(BackendError::MissingPrivateKey(Backend::Managed))?;
                let signer: PrivateKeySigner = key
                    .trim_start_matches("0x")
                    .parse()
                    .map_err(|_| ConnectorError::InvalidPrivateKey)?;
                let account = RoutedAccount::new(HttpSubmitter::new(signer), chains);
                Ok(Self::Managed(ManagedAccountSigner::new(account)))
            }
            Backend::Eip1193 => {
                let url = config.wallet_url()?;
                let client = Eip1193Client::connect_http(url, &chains).await?;
                Ok(Self::Eip1193(WalletClientAdapter::new(client, chains)))
            }
        }
    }
}

/// Creates a [`PrivateKeyConnector`] holding the configured key, connected
/// on the registry's default chain.
///
/// # Errors
///
/// Returns an error if no key is configured or it is invalid.
pub async fn connect_private_key(
    config: &WalletConfig,
    chains: ChainRegistry,
) -> Result<PrivateKeyConnector, BackendError> {
    let key = config
        .private_key()
        .ok_or(BackendError::MissingPrivateKey(config.backend))?;
    let connector = PrivateKeyConnector::new(chains);
    connector.set_private_key(Some(key))?;
    let connection = connector.connect(None).await?;
    tracing::debug!(chain_id = connection.chain_id, "Private key connected");
    Ok(connector)
}

impl SignerAdapter for ConfiguredSigner {
    type Error = SubmissionError;

    fn address(&self) -> Result<Address, SignerError<SubmissionError>> {
        match self {
            Self::LocalKey(s) => s.address().map_err(|e| e.map_backend(SubmissionError::LocalKey)),
            Self::Managed(s) => s.address().map_err(|e| e.map_backend(SubmissionError::Managed)),
            Self::Eip1193(s) => s.address().map_err(|e| e.map_backend(SubmissionError::Eip1193)),
        }
    }

    fn block_explorer_url(&self) -> Option<&Url> {
        match self {
            Self::LocalKey(s) => s.block_explorer_url(),
            Self::Managed(s) => s.block_explorer_url(),
            Self::Eip1193(s) => s.block_explorer_url(),
        }
    }

    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHash, SignerError<SubmissionError>> {
        match self {
            Self::LocalKey(s) => s
                .send_transaction(request)
                .await
                .map_err(|e| e.map_backend(SubmissionError::LocalKey)),
            Self::Managed(s) => s
                .send_transaction(request)
                .await
                .map_err(|e| e.map_backend(SubmissionError::Managed)),
            Self::Eip1193(s) => s
                .send_transaction(request)
                .await
                .map_err(|e| e.map_backend(SubmissionError::Eip1193)),
        }
    }
}

/// Link to `tx_hash` on `explorer`.
#[must_use]
pub fn explorer_tx_url(explorer: &Url, tx_hash: &TxHash) -> Option<Url> {
    let base = if explorer.path().ends_with('/') {
        explorer.clone()
    } else {
        let mut base = explorer.clone();
        base.set_path(&format!("{}/", explorer.path()));
        base
    };
    base.join(&format!("tx/{tx_hash}")).ok()
}
