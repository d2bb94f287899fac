use std::error::Error;

use crate::wallet::{WalletError, USER_REJECTED_CODE};

pub const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// The user declined the request in the wallet.
    Rejected,
    Other(String),
}

/// Sort a failed wallet request into "user said no" or anything else.
///
/// The whole `source()` chain is searched for a user-rejected RPC error, so
/// SDK wrappers around the rejection are still recognised.
pub fn classify(err: &(dyn Error + 'static)) -> ErrorClass {
    let rejected = std::iter::successors(Some(err), |&cause| cause.source()).any(|cause| {
        matches!(
            cause.downcast_ref::<WalletError>(),
            Some(WalletError::Rpc { code, .. }) if *code == USER_REJECTED_CODE
        )
    });
    if rejected {
        return ErrorClass::Rejected;
    }

    let message = err.to_string();
    if message.trim().is_empty() {
        ErrorClass::Other(FALLBACK_MESSAGE.to_string())
    } else {
        ErrorClass::Other(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_rejection() {
        assert_eq!(classify(&WalletError::user_rejected()), ErrorClass::Rejected);
    }

    #[test]
    fn wrapped_rejection() {
        let err = WalletError::wrap(
            "Request failed",
            WalletError::wrap("Provider error", WalletError::user_rejected()),
        );
        assert_eq!(classify(&err), ErrorClass::Rejected);
    }

    #[test]
    fn other_rpc_codes_are_surfaced() {
        let err = WalletError::Rpc {
            code: -32603,
            message: "boom".to_string(),
        };
        assert_eq!(classify(&err), ErrorClass::Other("boom".to_string()));
    }

    #[test]
    fn wrapper_message_is_reported() {
        let err = WalletError::wrap(
            "Grant failed",
            WalletError::Transport("connection reset".to_string()),
        );
        assert_eq!(classify(&err), ErrorClass::Other("Grant failed".to_string()));
    }

    #[test]
    fn empty_message_falls_back() {
        let err = WalletError::Rpc {
            code: -1,
            message: String::new(),
        };
        assert_eq!(classify(&err), ErrorClass::Other(FALLBACK_MESSAGE.to_string()));
    }

    #[test]
    fn foreign_errors_are_other() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert_eq!(classify(&err), ErrorClass::Other("timed out".to_string()));
    }
}
