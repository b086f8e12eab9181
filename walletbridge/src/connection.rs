//! Wallet connection providers.
//!
//! A connection provider supplies the raw account and chain state a signer
//! adapter is built from. The widget client reads a [`WalletSnapshot`] and
//! forwards connect, disconnect and switch-chain actions to the provider.

use std::future::Future;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::chain::{ChainDescriptor, ChainId, ChainRegistry};

/// Result of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connected accounts; the first one is active.
    pub accounts: Vec<Address>,
    /// Active chain after connecting.
    pub chain_id: ChainId,
}

/// Connection state as the widget client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    /// Active account, if connected.
    pub address: Option<Address>,
    /// Active chain, if connected.
    pub chain_id: Option<ChainId>,
    /// Chains the user may pick from.
    pub chains: Vec<ChainDescriptor>,
}

impl WalletSnapshot {
    /// Returns `true` if an account is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// A backend-specific wallet connection.
pub trait WalletConnection: Send + Sync {
    /// Backend error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Supported chains, default first.
    fn chains(&self) -> &ChainRegistry;

    /// The active account, if connected.
    fn account(&self) -> impl Future<Output = Option<Address>> + Send;

    /// The active chain, if connected.
    fn chain_id(&self) -> impl Future<Output = Option<ChainId>> + Send;

    /// Connects, optionally on a specific chain.
    fn connect(
        &self,
        chain_id: Option<ChainId>,
    ) -> impl Future<Output = Result<Connection, Self::Error>> + Send;

    /// Disconnects and forgets the active account and chain.
    fn disconnect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Makes `chain_id` the active chain.
    fn switch_chain(
        &self,
        chain_id: ChainId,
    ) -> impl Future<Output = Result<ChainDescriptor, Self::Error>> + Send;

    /// Captures the current state for the widget client.
    fn snapshot(&self) -> impl Future<Output = WalletSnapshot> + Send {
        async {
            WalletSnapshot {
                address: self.account().await,
                chain_id: self.chain_id().await,
                chains: self.chains().as_slice().to_vec(),
            }
        }
    }
}
