//! Error types for signer adapters.

use std::fmt;

use crate::chain::ChainId;
use crate::mismatch::{self, ErrorClass};

/// Errors returned by a [`SignerAdapter`](crate::SignerAdapter).
///
/// Generic over the backend's own error type `E`, which is carried through
/// unchanged: a failed submission surfaces as [`SignerError::Submission`]
/// with the exact error the backend produced.
#[derive(Debug, thiserror::Error)]
pub enum SignerError<E> {
    /// No account is bound to the adapter.
    #[error("account not found")]
    AccountMissing,

    /// The wallet rejected or could not perform a chain switch.
    #[error("failed to switch to chain {chain_id}: {source}")]
    ChainSwitchFailed {
        /// The chain the adapter tried to switch to.
        chain_id: ChainId,
        /// The backend error.
        #[source]
        source: E,
    },

    /// The backend does not know the requested chain.
    #[error("chain {0} is not supported")]
    UnsupportedChain(ChainId),

    /// The backend rejected the transaction.
    #[error(transparent)]
    Submission(E),
}

/// Coarse error category, independent of the backend error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No bound account; never retried.
    AccountMissing,
    /// Wrong network; already retried once after a forced switch.
    ChainMismatch,
    /// A chain switch failed or the chain is unknown to the backend.
    ChainSwitchFailed,
    /// Any other rejection from the backend.
    SubmissionFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AccountMissing => "account_missing",
            Self::ChainMismatch => "chain_mismatch",
            Self::ChainSwitchFailed => "chain_switch_failed",
            Self::SubmissionFailed => "submission_failed",
        };
        f.write_str(s)
    }
}

impl<E: fmt::Display> SignerError<E> {
    /// Returns the error category.
    ///
    /// A submission error whose text matches the chain-mismatch heuristic
    /// reports [`ErrorKind::ChainMismatch`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountMissing => ErrorKind::AccountMissing,
            Self::ChainSwitchFailed { .. } | Self::UnsupportedChain(_) => {
                ErrorKind::ChainSwitchFailed
            }
            Self::Submission(e) => match mismatch::classify(&e.to_string()) {
                ErrorClass::ChainMismatch(_) => ErrorKind::ChainMismatch,
                ErrorClass::Other => ErrorKind::SubmissionFailed,
            },
        }
    }
}

impl<E> SignerError<E> {
    /// Maps the backend error type, keeping the variant.
    pub fn map_backend<F>(self, f: impl FnOnce(E) -> F) -> SignerError<F> {
        match self {
            Self::AccountMissing => SignerError::AccountMissing,
            Self::ChainSwitchFailed { chain_id, source } => SignerError::ChainSwitchFailed {
                chain_id,
                source: f(source),
            },
            Self::UnsupportedChain(id) => SignerError::UnsupportedChain(id),
            Self::Submission(e) => SignerError::Submission(f(e)),
        }
    }

    /// Returns the backend error of a failed submission.
    #[must_use]
    pub const fn as_submission(&self) -> Option<&E> {
        match self {
            Self::Submission(e) => Some(e),
            _ => None,
        }
    }
}
