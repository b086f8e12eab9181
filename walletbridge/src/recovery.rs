//! Chain-mismatch recovery shared by every adapter.
//!
//! A send runs through these states:
//!
//! ```text
//! Validating -> [Switching] -> Submitting -> Success
//!                                  |
//!                                  +-> Failed (not a mismatch, or no chain to recover on)
//!                                  |
//!                                  +-> MismatchDetected -> Switching -> Submitting -> Success | Failed
//! ```
//!
//! The retry branch is entered at most once per send.

use std::future::Future;

use alloy_primitives::{Address, TxHash};

use crate::chain::ChainId;
use crate::error::SignerError;
use crate::mismatch::{self, ErrorClass};
use crate::request::TransactionRequest;

/// The backend operations the recovery driver needs.
///
/// Adapters implement this on top of their native wallet handle and then
/// delegate [`SignerAdapter::send_transaction`](crate::SignerAdapter::send_transaction)
/// to [`send_with_chain_recovery`].
pub trait ChainBackend: Send + Sync {
    /// Native backend error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The bound account, if any. Must not perform I/O.
    fn account(&self) -> Option<Address>;

    /// Asks the wallet to make `chain_id` its active chain.
    ///
    /// Backends that route every submission to its own chain may treat this
    /// as a no-op.
    fn switch_chain(
        &self,
        chain_id: ChainId,
    ) -> impl Future<Output = Result<(), SignerError<Self::Error>>> + Send;

    /// Submits `request` once, targeting `chain_id`.
    fn submit(
        &self,
        request: &TransactionRequest,
        chain_id: Option<ChainId>,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;
}

/// Sends `request` through `backend`, retrying once on a chain mismatch.
///
/// 1. Fails with [`SignerError::AccountMissing`] if no account is bound.
/// 2. If the request names a chain, switches to it; a failure here is only logged.
/// 3. Submits. On success returns the hash.
/// 4. On a chain-mismatch error, recovers the expected chain from the message
///    (falling back to the request's chain), forces a switch and submits again.
///    A failed retry returns the first error.
/// 5. Any other error is returned unchanged.
///
/// # Errors
///
/// [`SignerError::AccountMissing`], a switch error from the forced switch, or
/// [`SignerError::Submission`] carrying the first submission error.
pub async fn send_with_chain_recovery<B>(
    backend: &B,
    request: &TransactionRequest,
) -> Result<TxHash, SignerError<B::Error>>
where
    B: ChainBackend + ?Sized,
{
    let Some(account) = backend.account() else {
        return Err(SignerError::AccountMissing);
    };

    if let Some(chain_id) = request.chain_id {
        if let Err(e) = backend.switch_chain(chain_id).await {
            tracing::warn!(%account, chain_id, error = %e, "Chain switch before submission failed");
        }
    }

    let error = match backend.submit(request, request.chain_id).await {
        Ok(hash) => return Ok(hash),
        Err(e) => e,
    };

    let ErrorClass::ChainMismatch(detected) = mismatch::classify(&error.to_string()) else {
        return Err(SignerError::Submission(error));
    };
    let Some(expected) = detected.recover(request.chain_id) else {
        tracing::warn!(%account, error = %error, "Chain mismatch without a recoverable chain ID");
        return Err(SignerError::Submission(error));
    };

    tracing::warn!(%account, expected, "Chain mismatch detected, switching chain and retrying");
    backend.switch_chain(expected).await?;

    match backend.submit(request, Some(expected)).await {
        Ok(hash) => {
            tracing::info!(%account, chain_id = expected, tx = %hash, "Retry after chain switch succeeded");
            Ok(hash)
        }
        Err(retry_error) => {
            tracing::warn!(%account, chain_id = expected, error = %retry_error, "Retry after chain switch failed");
            Err(SignerError::Submission(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloy_primitives::{B256, address};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("{0}")]
    struct ScriptError(String);

    const MISMATCH_8453: &str =
        "chain of the wallet (1) does not match the target chain. Expected Chain ID: 8453";
    const MISMATCH_NO_ID: &str = "chain of the wallet (1) does not match the target chain";

    #[derive(Default)]
    struct Calls {
        switches: Vec<ChainId>,
        submits: Vec<Option<ChainId>>,
    }

    struct ScriptedBackend {
        account: Option<Address>,
        submissions: Mutex<VecDeque<Result<TxHash, ScriptError>>>,
        switch_failure: Option<ScriptError>,
        calls: Mutex<Calls>,
    }

    impl ScriptedBackend {
        fn new(submissions: Vec<Result<TxHash, ScriptError>>) -> Self {
            Self {
                account: Some(address!("1111111111111111111111111111111111111111")),
                submissions: Mutex::new(submissions.into()),
                switch_failure: None,
                calls: Mutex::new(Calls::default()),
            }
        }

        fn switches(&self) -> Vec<ChainId> {
            self.calls.lock().unwrap().switches.clone()
        }

        fn submits(&self) -> Vec<Option<ChainId>> {
            self.calls.lock().unwrap().submits.clone()
        }
    }

    impl ChainBackend for ScriptedBackend {
        type Error = ScriptError;

        fn account(&self) -> Option<Address> {
            self.account
        }

        async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SignerError<ScriptError>> {
            self.calls.lock().unwrap().switches.push(chain_id);
            match &self.switch_failure {
                Some(e) => Err(SignerError::ChainSwitchFailed {
                    chain_id,
                    source: e.clone(),
                }),
                None => Ok(()),
            }
        }

        async fn submit(
            &self,
            _request: &TransactionRequest,
            chain_id: Option<ChainId>,
        ) -> Result<TxHash, ScriptError> {
            self.calls.lock().unwrap().submits.push(chain_id);
            self.submissions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScriptError("script exhausted".into())))
        }
    }

    fn hash(byte: u8) -> TxHash {
        B256::repeat_byte(byte)
    }

    fn request() -> TransactionRequest {
        TransactionRequest::new(address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"))
    }

    #[tokio::test]
    async fn test_no_target_chain_never_switches() {
        let backend = ScriptedBackend::new(vec![Ok(hash(1))]);
        let tx = send_with_chain_recovery(&backend, &request()).await.unwrap();
        assert_eq!(tx, hash(1));
        assert!(backend.switches().is_empty());
        assert_eq!(backend.submits(), vec![None]);
    }

    #[tokio::test]
    async fn test_target_chain_switches_then_submits() {
        let backend = ScriptedBackend::new(vec![Ok(hash(1))]);
        let tx = send_with_chain_recovery(&backend, &request().with_chain_id(8453))
            .await
            .unwrap();
        assert_eq!(tx, hash(1));
        assert_eq!(backend.switches(), vec![8453]);
        assert_eq!(backend.submits(), vec![Some(8453)]);
    }

    #[tokio::test]
    async fn test_mismatch_retries_once_on_extracted_chain() {
        let backend = ScriptedBackend::new(vec![
            Err(ScriptError(MISMATCH_8453.into())),
            Ok(hash(2)),
        ]);
        let tx = send_with_chain_recovery(&backend, &request().with_chain_id(10))
            .await
            .unwrap();
        assert_eq!(tx, hash(2));
        assert_eq!(backend.switches(), vec![10, 8453]);
        assert_eq!(backend.submits(), vec![Some(10), Some(8453)]);
    }

    #[tokio::test]
    async fn test_mismatch_without_id_falls_back_to_target() {
        let backend = ScriptedBackend::new(vec![
            Err(ScriptError(MISMATCH_NO_ID.into())),
            Ok(hash(3)),
        ]);
        let tx = send_with_chain_recovery(&backend, &request().with_chain_id(137))
            .await
            .unwrap();
        assert_eq!(tx, hash(3));
        assert_eq!(backend.submits(), vec![Some(137), Some(137)]);
    }

    #[tokio::test]
    async fn test_mismatch_without_any_chain_is_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(ScriptError(MISMATCH_NO_ID.into()))]);
        let err = send_with_chain_recovery(&backend, &request())
            .await
            .unwrap_err();
        assert_eq!(err.as_submission(), Some(&ScriptError(MISMATCH_NO_ID.into())));
        assert_eq!(err.kind(), ErrorKind::ChainMismatch);
        assert!(backend.switches().is_empty());
        assert_eq!(backend.submits().len(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(ScriptError("insufficient funds".into())),
            Ok(hash(9)),
        ]);
        let err = send_with_chain_recovery(&backend, &request().with_chain_id(8453))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.kind(), ErrorKind::SubmissionFailed);
        assert_eq!(backend.submits().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_retry_returns_original_error() {
        let backend = ScriptedBackend::new(vec![
            Err(ScriptError(MISMATCH_8453.into())),
            Err(ScriptError("replacement transaction underpriced".into())),
        ]);
        let err = send_with_chain_recovery(&backend, &request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISMATCH_8453);
        assert_eq!(backend.submits(), vec![None, Some(8453)]);
    }

    #[tokio::test]
    async fn test_repeated_mismatch_retries_only_once() {
        let backend = ScriptedBackend::new(vec![
            Err(ScriptError(MISMATCH_8453.into())),
            Err(ScriptError(MISMATCH_8453.into())),
            Ok(hash(4)),
        ]);
        let result = send_with_chain_recovery(&backend, &request()).await;
        assert!(result.is_err());
        assert_eq!(backend.submits().len(), 2);
        assert_eq!(backend.switches(), vec![8453]);
    }

    #[tokio::test]
    async fn test_missing_account_skips_backend() {
        let mut backend = ScriptedBackend::new(vec![Ok(hash(1))]);
        backend.account = None;
        let err = send_with_chain_recovery(&backend, &request().with_chain_id(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::AccountMissing));
        assert!(backend.switches().is_empty());
        assert!(backend.submits().is_empty());
    }

    #[tokio::test]
    async fn test_proactive_switch_failure_is_not_fatal() {
        let mut backend = ScriptedBackend::new(vec![Ok(hash(5))]);
        backend.switch_failure = Some(ScriptError("user rejected".into()));
        let tx = send_with_chain_recovery(&backend, &request().with_chain_id(56))
            .await
            .unwrap();
        assert_eq!(tx, hash(5));
    }

    #[tokio::test]
    async fn test_forced_switch_failure_is_surfaced() {
        let mut backend = ScriptedBackend::new(vec![
            Err(ScriptError(MISMATCH_8453.into())),
            Ok(hash(6)),
        ]);
        backend.switch_failure = Some(ScriptError("user rejected".into()));
        let err = send_with_chain_recovery(&backend, &request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SignerError::ChainSwitchFailed { chain_id: 8453, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::ChainSwitchFailed);
        assert_eq!(backend.submits().len(), 1);
    }
}
