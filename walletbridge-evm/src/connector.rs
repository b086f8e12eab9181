//! In-memory private-key wallet connector.
//!
//! Holds a private key entered by the user and the chain it is connected
//! on, exposes the [`WalletConnection`] surface a widget drives, and answers
//! the subset of EIP-1193 requests a dapp issues against an injected wallet.
//! Signer adapters built from the connector read the key through the
//! connector, so a disconnect drops it for them too.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock as KeyLock};

use alloy_dyn_abi::eip712::TypedData;
use alloy_primitives::{Address, TxHash, hex};
use alloy_rpc_types_eth::TransactionRequest as RpcTransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use serde_json::Value;
use tokio::sync::RwLock;
use walletbridge::{ChainDescriptor, ChainId, ChainRegistry, Connection, WalletConnection};

use crate::local::LocalKeySigner;
use crate::submitter::{HttpSubmitter, SubmitError, TransactionSubmitter};

/// Errors from [`PrivateKeyConnector`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// No key has been set, or it was cleared by a disconnect.
    #[error("no private key found")]
    NoPrivateKey,
    /// The key is not a valid secp256k1 secret key.
    #[error("invalid private key")]
    InvalidPrivateKey,
    /// The chain is not in the connector's registry.
    #[error("chain {0} not supported")]
    UnsupportedChain(ChainId),
    /// The connector's registry is empty.
    #[error("no chains configured")]
    NoChains,
    /// The EIP-1193 method is not implemented.
    #[error("method {0} not supported")]
    UnsupportedMethod(String),
    /// Missing or malformed request parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// The typed data could not be hashed.
    #[error(transparent)]
    TypedData(#[from] alloy_dyn_abi::Error),
    /// Signing failed.
    #[error(transparent)]
    Signing(#[from] alloy_signer::Error),
    /// Broadcasting failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// The connector's key, shared with the adapters it hands out.
///
/// Reads and writes never await, so a blocking lock is enough.
#[derive(Clone, Default)]
struct KeySlot(Arc<KeyLock<Option<PrivateKeySigner>>>);

impl KeySlot {
    fn get(&self) -> Option<PrivateKeySigner> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn address(&self) -> Option<Address> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(PrivateKeySigner::address)
    }

    fn replace(&self, signer: Option<PrivateKeySigner>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = signer;
    }
}

impl fmt::Debug for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeySlot").field(&self.address()).finish()
    }
}

/// Submits with whatever key the issuing [`PrivateKeyConnector`] holds.
///
/// Once the connector is disconnected or its key cleared, [`address`] is
/// `None` and submissions fail with [`ConnectorError::NoPrivateKey`].
///
/// [`address`]: TransactionSubmitter::address
#[derive(Debug, Clone)]
pub struct ConnectedSubmitter {
    key: KeySlot,
}

impl TransactionSubmitter for ConnectedSubmitter {
    type Error = ConnectorError;

    fn address(&self) -> Option<Address> {
        self.key.address()
    }

    async fn submit(
        &self,
        chain: &ChainDescriptor,
        tx: RpcTransactionRequest,
    ) -> Result<TxHash, ConnectorError> {
        let signer = self.key.get().ok_or(ConnectorError::NoPrivateKey)?;
        Ok(HttpSubmitter::new(signer).submit(chain, tx).await?)
    }
}

/// A wallet connection backed by a private key held in memory.
#[derive(Debug)]
pub struct PrivateKeyConnector {
    chains: ChainRegistry,
    key: KeySlot,
    chain_id: RwLock<Option<ChainId>>,
}

impl Default for PrivateKeyConnector {
    fn default() -> Self {
        Self::new(ChainRegistry::default())
    }
}

impl PrivateKeyConnector {
    /// Creates a disconnected connector over `chains`; the first is the default.
    pub fn new(chains: ChainRegistry) -> Self {
        Self {
            chains,
            key: KeySlot::default(),
            chain_id: RwLock::new(None),
        }
    }

    /// Sets or, with `None`, clears the private key.
    ///
    /// The key is hex, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidPrivateKey`] if `key` does not parse;
    /// the previous key is kept in that case.
    pub fn set_private_key(&self, key: Option<&str>) -> Result<(), ConnectorError> {
        let signer = key.map(parse_private_key).transpose()?;
        match &signer {
            Some(s) => tracing::info!(address = %s.address(), "Private key set"),
            None => tracing::info!("Private key cleared"),
        }
        self.key.replace(signer);
        Ok(())
    }

    /// Returns `true` if a key is set.
    #[must_use]
    pub fn has_private_key(&self) -> bool {
        self.key.address().is_some()
    }

    /// Returns `true` if the connector can connect without prompting.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.has_private_key()
    }

    /// The key's account, or nothing without a key.
    #[must_use]
    pub fn accounts(&self) -> Vec<Address> {
        self.key.address().into_iter().collect()
    }

    /// Disconnects when the wallet reports no accounts.
    pub async fn on_accounts_changed(&self, accounts: &[Address]) {
        tracing::debug!(?accounts, "Accounts changed");
        if accounts.is_empty() {
            self.clear().await;
        }
    }

    /// Follows a chain change reported by the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::UnsupportedChain`] for chains outside the registry.
    pub async fn on_chain_changed(&self, chain_id: ChainId) -> Result<(), ConnectorError> {
        self.select_chain(chain_id).await.map(|_| ())
    }

    /// Builds a signer adapter for the current key on `chain_id`, else the
    /// current chain, else the default chain.
    ///
    /// The adapter signs with the connector's key at submission time: a key
    /// change carries over, and after a disconnect the adapter reports
    /// [`SignerError::AccountMissing`](walletbridge::SignerError::AccountMissing).
    /// Its active chain is its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::NoPrivateKey`] without a key.
    pub async fn signer(
        &self,
        chain_id: Option<ChainId>,
    ) -> Result<LocalKeySigner<ConnectedSubmitter>, ConnectorError> {
        if self.key.address().is_none() {
            return Err(ConnectorError::NoPrivateKey);
        }
        let current = *self.chain_id.read().await;
        let chain = self.resolve_chain(chain_id.or(current))?.clone();
        let submitter = ConnectedSubmitter {
            key: self.key.clone(),
        };
        Ok(LocalKeySigner::new(submitter, self.chains.clone(), chain))
    }

    /// Answers an EIP-1193 request.
    ///
    /// Supported methods: `eth_chainId`, `eth_accounts`,
    /// `eth_sendTransaction`, `eth_signTypedData_v4`,
    /// `wallet_switchEthereumChain` and `wallet_addEthereumChain`. Adding a
    /// chain only succeeds for registry chains and also switches to it.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::UnsupportedMethod`] for any other method, otherwise
    /// the error of the method handler.
    pub async fn request(&self, method: &str, params: &[Value]) -> Result<Value, ConnectorError> {
        tracing::debug!(method, "EIP-1193 request");
        match method {
            "eth_chainId" => {
                let chain_id = self.current_or_default().await?;
                Ok(Value::String(format!("{chain_id:#x}")))
            }
            "eth_accounts" => Ok(Value::from(
                self.accounts()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            )),
            "eth_sendTransaction" => {
                let tx_hash = self.send_transaction(params).await?;
                Ok(Value::String(tx_hash.to_string()))
            }
            "eth_signTypedData_v4" => self.sign_typed_data(params).await.map(Value::String),
            "wallet_switchEthereumChain" | "wallet_addEthereumChain" => {
                let chain_id = chain_id_param(params)?;
                self.select_chain(chain_id).await?;
                Ok(Value::Null)
            }
            other => {
                tracing::warn!(method = other, "Unsupported EIP-1193 method");
                Err(ConnectorError::UnsupportedMethod(other.to_owned()))
            }
        }
    }

    async fn clear(&self) {
        let mut chain_id = self.chain_id.write().await;
        self.key.replace(None);
        *chain_id = None;
        tracing::info!("Disconnected");
    }

    async fn select_chain(&self, chain_id: ChainId) -> Result<ChainDescriptor, ConnectorError> {
        let chain = self
            .chains
            .by_id(chain_id)
            .ok_or(ConnectorError::UnsupportedChain(chain_id))?;
        let mut current = self.chain_id.write().await;
        tracing::debug!(from = ?*current, to = chain_id, "Switching chain");
        *current = Some(chain_id);
        Ok(chain.clone())
    }

    fn resolve_chain(&self, requested: Option<ChainId>) -> Result<&ChainDescriptor, ConnectorError> {
        let default = self.chains.default_chain().ok_or(ConnectorError::NoChains)?;
        let Some(chain_id) = requested else {
            return Ok(default);
        };
        Ok(self.chains.by_id(chain_id).unwrap_or_else(|| {
            tracing::warn!(chain_id, default = default.id, "Unknown chain, using default");
            default
        }))
    }

    async fn current_or_default(&self) -> Result<ChainId, ConnectorError> {
        let current = *self.chain_id.read().await;
        self.resolve_chain(current).map(|chain| chain.id)
    }

    async fn active(&self) -> Result<(PrivateKeySigner, ChainDescriptor), ConnectorError> {
        let signer = self.key.get().ok_or(ConnectorError::NoPrivateKey)?;
        let current = *self.chain_id.read().await;
        let chain = self.resolve_chain(current)?.clone();
        Ok((signer, chain))
    }

    async fn send_transaction(&self, params: &[Value]) -> Result<TxHash, ConnectorError> {
        let tx = params
            .first()
            .ok_or_else(|| ConnectorError::InvalidParams("missing transaction".into()))?;
        for field in ["to", "data"] {
            if let Some(value) = tx.get(field).and_then(Value::as_str) {
                if !value.starts_with("0x") {
                    return Err(ConnectorError::InvalidParams(format!("invalid {field} field")));
                }
            }
        }
        let tx: RpcTransactionRequest = serde_json::from_value(tx.clone())
            .map_err(|e| ConnectorError::InvalidParams(e.to_string()))?;

        let (signer, chain) = self.active().await?;
        let tx_hash = HttpSubmitter::new(signer).submit(&chain, tx).await?;
        Ok(tx_hash)
    }

    async fn sign_typed_data(&self, params: &[Value]) -> Result<String, ConnectorError> {
        let [account, typed_data, ..] = params else {
            return Err(ConnectorError::InvalidParams(
                "expected [address, typedData]".into(),
            ));
        };
        let typed_data: TypedData = match typed_data {
            Value::String(json) => serde_json::from_str(json),
            other => serde_json::from_value(other.clone()),
        }
        .map_err(|e| ConnectorError::InvalidParams(e.to_string()))?;

        let (signer, _) = self.active().await?;
        let requested: Address = serde_json::from_value(account.clone())
            .map_err(|e| ConnectorError::InvalidParams(e.to_string()))?;
        if requested != signer.address() {
            return Err(ConnectorError::InvalidParams(format!(
                "{requested} is not the connected account"
            )));
        }

        let hash = typed_data.eip712_signing_hash()?;
        let signature = signer.sign_hash(&hash).await?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }
}

impl WalletConnection for PrivateKeyConnector {
    type Error = ConnectorError;

    fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    async fn account(&self) -> Option<Address> {
        self.key.address()
    }

    async fn chain_id(&self) -> Option<ChainId> {
        self.current_or_default().await.ok()
    }

    async fn connect(&self, chain_id: Option<ChainId>) -> Result<Connection, ConnectorError> {
        let mut current = self.chain_id.write().await;
        let address = self.key.address().ok_or(ConnectorError::NoPrivateKey)?;
        let chain_id = self.resolve_chain(chain_id.or(*current))?.id;
        *current = Some(chain_id);
        tracing::info!(%address, chain_id, "Connected");
        Ok(Connection {
            accounts: vec![address],
            chain_id,
        })
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.clear().await;
        Ok(())
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<ChainDescriptor, ConnectorError> {
        self.select_chain(chain_id).await
    }
}

fn parse_private_key(key: &str) -> Result<PrivateKeySigner, ConnectorError> {
    let key = key.trim();
    key.strip_prefix("0x")
        .unwrap_or(key)
        .parse()
        .map_err(|_| ConnectorError::InvalidPrivateKey)
}

/// Reads `params[0].chainId`, given as a hex or decimal string or a number.
fn chain_id_param(params: &[Value]) -> Result<ChainId, ConnectorError> {
    let missing = || ConnectorError::InvalidParams("missing chainId".into());
    let value = params
        .first()
        .and_then(|p| p.get("chainId"))
        .ok_or_else(missing)?;
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => ChainId::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    };
    parsed.ok_or_else(|| ConnectorError::InvalidParams(format!("invalid chainId {value}")))
}
