//! Chain-mismatch classification of backend error text.
//!
//! Wallet backends report a transaction aimed at the wrong network with
//! similar but not identical free text. Classification works on the error's
//! display string only, so it can later be replaced by structured error
//! codes without touching the retry driver in [`crate::recovery`].
//!
//! The heuristic is deliberately narrow: both phrases must be present.

use std::sync::LazyLock;

use regex::Regex;

use crate::chain::ChainId;

const WALLET_CHAIN_PHRASE: &str = "chain of the wallet";
const TARGET_CHAIN_PHRASE: &str = "does not match the target chain";
const UNRECOGNIZED_CHAIN_PHRASE: &str = "Unrecognized chain ID";

static EXPECTED_CHAIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Expected Chain ID: (\d+)").expect("valid regex"));

/// A detected chain mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMismatch {
    /// Chain ID named by the error message, if it names one.
    pub expected: Option<ChainId>,
}

impl ChainMismatch {
    /// Detects a chain mismatch in an error message.
    ///
    /// Returns `None` unless the message contains both
    /// `"chain of the wallet"` and `"does not match the target chain"`.
    #[must_use]
    pub fn detect(message: &str) -> Option<Self> {
        if !(message.contains(WALLET_CHAIN_PHRASE) && message.contains(TARGET_CHAIN_PHRASE)) {
            return None;
        }
        let expected = EXPECTED_CHAIN_ID
            .captures(message)
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse().ok());
        Some(Self { expected })
    }

    /// The chain to recover on: the ID from the message, else `fallback`.
    #[must_use]
    pub fn recover(self, fallback: Option<ChainId>) -> Option<ChainId> {
        self.expected.or(fallback)
    }
}

/// How the recovery driver should treat a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Wrong network; eligible for one switch-and-retry.
    ChainMismatch(ChainMismatch),
    /// Anything else; propagated without retry.
    Other,
}

/// Classifies a backend error message.
#[must_use]
pub fn classify(message: &str) -> ErrorClass {
    ChainMismatch::detect(message).map_or(ErrorClass::Other, ErrorClass::ChainMismatch)
}

/// Returns `true` if a wallet rejected a chain switch because it does not
/// know the chain yet (EIP-3085 `wallet_addEthereumChain` is needed first).
#[must_use]
pub fn is_unrecognized_chain(message: &str) -> bool {
    message.contains(UNRECOGNIZED_CHAIN_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISMATCH: &str =
        "chain of the wallet (1) does not match the target chain. Expected Chain ID: 8453";

    #[test]
    fn test_detects_mismatch_with_expected_id() {
        let mismatch = ChainMismatch::detect(MISMATCH).unwrap();
        assert_eq!(mismatch.expected, Some(8453));
        assert_eq!(mismatch.recover(Some(10)), Some(8453));
    }

    #[test]
    fn test_detects_mismatch_without_expected_id() {
        let message = "The current chain of the wallet (id: 1) does not match the target chain for the transaction (id: 8453 – Base).";
        let mismatch = ChainMismatch::detect(message).unwrap();
        assert_eq!(mismatch.expected, None);
        assert_eq!(mismatch.recover(Some(10)), Some(10));
        assert_eq!(mismatch.recover(None), None);
    }

    #[test]
    fn test_requires_both_phrases() {
        assert!(ChainMismatch::detect("chain of the wallet is locked").is_none());
        assert!(ChainMismatch::detect("id does not match the target chain").is_none());
        assert_eq!(classify("insufficient funds for gas"), ErrorClass::Other);
    }

    #[test]
    fn test_expected_id_overflow_is_ignored() {
        let message = "chain of the wallet (1) does not match the target chain. Expected Chain ID: 99999999999999999999999";
        assert_eq!(ChainMismatch::detect(message).unwrap().expected, None);
    }

    #[test]
    fn test_classify_embedded_in_transport_error() {
        let message = format!("server returned an error response: error code -32000: {MISMATCH}");
        assert_eq!(
            classify(&message),
            ErrorClass::ChainMismatch(ChainMismatch {
                expected: Some(8453)
            })
        );
    }

    #[test]
    fn test_unrecognized_chain() {
        assert!(is_unrecognized_chain(
            "Unrecognized chain ID \"0x2105\". Try adding the chain using wallet_addEthereumChain first."
        ));
        assert!(!is_unrecognized_chain("User rejected the request."));
    }
}
