#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for walletbridge.
//!
//! This crate defines the backend-agnostic surface a fund-transfer client
//! needs from a connected wallet: an account address and a way to submit a
//! transaction. Concrete wallet backends live in `walletbridge-evm`.
//!
//! # Modules
//!
//! - [`adapter`] - The [`SignerAdapter`] capability contract
//! - [`chain`] - Chain descriptors and the chain registry
//! - [`connection`] - Wallet connection providers and the snapshot a widget consumes
//! - [`error`] - Adapter error kinds
//! - [`mismatch`] - Chain-mismatch classification of backend error text
//! - [`networks`] - The static supported-chain registry
//! - [`recovery`] - The shared switch/submit/retry-once driver
//! - [`request`] - The [`TransactionRequest`] submitted through an adapter

pub mod adapter;
pub mod chain;
pub mod connection;
pub mod error;
pub mod mismatch;
pub mod networks;
pub mod recovery;
pub mod request;

pub use adapter::SignerAdapter;
pub use chain::{ChainDescriptor, ChainId, ChainRegistry, NativeCurrency};
pub use connection::{Connection, WalletConnection, WalletSnapshot};
pub use error::{ErrorKind, SignerError};
pub use recovery::{ChainBackend, send_with_chain_recovery};
pub use request::TransactionRequest;
