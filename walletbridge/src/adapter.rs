//! The signer adapter capability contract.
//!
//! Each wallet-connection backend wraps its native account object in an
//! adapter implementing [`SignerAdapter`]. The widget client only sees this
//! trait; which backend sits behind it is decided when the application is
//! composed.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use url::Url;

use crate::error::SignerError;
use crate::request::TransactionRequest;

/// A connected account able to submit transactions.
///
/// Implementations own exactly one backend handle, fixed at construction.
/// When the active account or backend changes, build a new adapter instead
/// of mutating the old one.
///
/// Sends are not queued: callers must not issue concurrent
/// [`send_transaction`](Self::send_transaction) calls on the same adapter.
pub trait SignerAdapter: Send + Sync {
    /// Backend error type carried by [`SignerError`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the bound account's address.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::AccountMissing`] if no account is bound.
    fn address(&self) -> Result<Address, SignerError<Self::Error>>;

    /// Block explorer for the adapter's chain, if the backend exposes one.
    fn block_explorer_url(&self) -> Option<&Url>;

    /// Submits a transaction and returns its hash.
    ///
    /// Recovers from a chain mismatch by switching chains and retrying once;
    /// see [`send_with_chain_recovery`](crate::recovery::send_with_chain_recovery).
    fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<TxHash, SignerError<Self::Error>>> + Send;
}

impl<T: SignerAdapter> SignerAdapter for Arc<T> {
    type Error = T::Error;

    fn address(&self) -> Result<Address, SignerError<Self::Error>> {
        (**self).address()
    }

    fn block_explorer_url(&self) -> Option<&Url> {
        (**self).block_explorer_url()
    }

    fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<TxHash, SignerError<Self::Error>>> + Send {
        (**self).send_transaction(request)
    }
}
