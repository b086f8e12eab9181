#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM wallet backends for walletbridge.
//!
//! Three signer adapters cover the wallet-connection styles an application
//! may be composed with:
//!
//! - [`ManagedAccountSigner`] wraps a managed smart account that routes each
//!   transaction to its own chain.
//! - [`WalletClientAdapter`] wraps an injected or remote EIP-1193 wallet that
//!   owns chain switching.
//! - [`LocalKeySigner`] signs with a private key and tracks the active chain
//!   itself.
//!
//! All three delegate their send path to
//! [`walletbridge::send_with_chain_recovery`], so they recover from a chain
//! mismatch the same way.
//!
//! # Modules
//!
//! - [`connector`] - Private-key wallet connector with an EIP-1193 request surface
//! - [`local`] - Private-key signer adapter
//! - [`managed`] - Managed-account signer adapter
//! - [`submitter`] - Signing and broadcasting over JSON-RPC
//! - [`tx`] - Conversion to Alloy transaction requests
//! - [`wallet_client`] - EIP-1193 wallet client adapter

#[cfg(feature = "connector")]
pub mod connector;
pub mod local;
pub mod managed;
pub mod submitter;
pub mod tx;
pub mod wallet_client;

#[cfg(test)]
mod testing;

#[cfg(feature = "connector")]
pub use connector::{ConnectedSubmitter, ConnectorError, PrivateKeyConnector};
pub use local::LocalKeySigner;
pub use managed::{ManagedAccount, ManagedAccountSigner, RoutedAccount, RoutedAccountError};
pub use submitter::{HttpSubmitter, SubmitError, TransactionSubmitter};
pub use wallet_client::{Eip1193Client, WalletClient, WalletClientAdapter};
