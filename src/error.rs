//! Error types for the Antelope SDK
//!
//! Every pipeline failure is representable as a chain of causes. Wrapping
//! layers keep the original error reachable through [`std::error::Error::source`],
//! so a caller can always tell a backend rejection apart from an internal or
//! transport failure, no matter how deeply it was wrapped.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

use crate::constants::BACKEND_ERROR_DELIMITER;

/// All errors raised by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure while assembling the transaction, before any network write.
    #[error("transaction prepare failed: {message}")]
    Prepare {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Failure while computing digests or collecting signatures.
    #[error("transaction signing failed: {message}")]
    Sign {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Failure while pushing the signed transaction to the node.
    #[error("transaction broadcast failed: {message}")]
    Broadcast {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The node itself reported an error (as opposed to the call failing).
    #[error("node returned an error: {0}")]
    Rpc(#[from] RpcResponseError),

    /// Transport-level failure: DNS, connection refused, timeout, garbled body.
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// ABI-driven encoding or decoding failed.
    #[error("serialization failed: {message}")]
    Serialization { message: String },

    /// The ABI for an account could not be fetched or decoded.
    #[error("could not resolve ABI for account \"{account}\": {message}")]
    AbiFetch {
        account: String,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Key material could not be parsed, imported, or used.
    #[error("key handling failed: {message}")]
    Key { message: String },

    /// An operation was called in the wrong processor state.
    #[error("invalid processor state: {message}")]
    InvalidState { message: String },

    /// Action index outside the prepared action sequence.
    #[error("action index {index} out of bounds (transaction has {len} actions)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A decoded return value cannot be represented as the requested type.
    #[error("cannot represent action return value ({abi_type}) as {target}")]
    TypeMismatch { abi_type: String, target: String },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn prepare(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::Prepare {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub fn sign(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::Sign {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub fn broadcast(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::Broadcast {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Error::Serialization {
            message: message.into(),
        }
    }

    pub fn key(message: impl Into<String>) -> Self {
        Error::Key {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn type_mismatch(abi_type: impl Into<String>, target: impl Into<String>) -> Self {
        Error::TypeMismatch {
            abi_type: abi_type.into(),
            target: target.into(),
        }
    }

    /// The backend error embedded anywhere in this error's cause chain.
    pub fn backend_error(&self) -> Option<&RpcResponseError> {
        extract_backend_error(self)
    }
}

/// A structured failure reported by the node itself.
///
/// Wire shape of a rejected `push_transaction` (and any other non-2xx chain
/// endpoint response): an outer HTTP-level code and message plus a nested
/// `error` object with per-frame details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct RpcResponseError {
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: BackendError,
}

/// The nested `error` object of an [`RpcResponseError`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

/// One detail frame of a backend error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line_number: u64,
    #[serde(default)]
    pub method: String,
}

/// Walk an error chain from the outermost failure to the root cause and
/// return the first node matching `predicate`.
pub fn find_cause<'a>(
    err: &'a (dyn StdError + 'static),
    predicate: impl Fn(&(dyn StdError + 'static)) -> bool,
) -> Option<&'a (dyn StdError + 'static)> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(node) = current {
        if predicate(node) {
            return Some(node);
        }
        current = node.source();
    }
    None
}

/// Extract the backend-reported [`RpcResponseError`] from anywhere in an
/// error chain, or `None` if no layer wrapped one.
pub fn extract_backend_error(err: &(dyn StdError + 'static)) -> Option<&RpcResponseError> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(node) = current {
        if let Some(rpc) = node.downcast_ref::<RpcResponseError>() {
            return Some(rpc);
        }
        current = node.source();
    }
    None
}

/// Format a backend error into a single human-readable line: the top-level
/// message, the backend error code, and each detail message in list order,
/// all joined with a fixed delimiter.
pub fn format_backend_message(err: &RpcResponseError) -> String {
    let mut parts = Vec::with_capacity(err.error.details.len() + 1);
    parts.push(format!(
        "{}{}Code: {}",
        err.message, BACKEND_ERROR_DELIMITER, err.error.code
    ));
    for detail in &err.error.details {
        parts.push(detail.message.clone());
    }
    parts.join(BACKEND_ERROR_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_backend_error() -> RpcResponseError {
        RpcResponseError {
            code: 500,
            message: "Internal Service Error".to_string(),
            error: BackendError {
                code: 3050003,
                name: "eosio_assert_message_exception".to_string(),
                what: "eosio_assert_message assertion failure".to_string(),
                details: vec![
                    ErrorDetail {
                        message: "assertion failure with message: overdrawn balance".to_string(),
                        file: "cf_system.cpp".to_string(),
                        line_number: 14,
                        method: "eosio_assert".to_string(),
                    },
                    ErrorDetail {
                        message: "pending console output:".to_string(),
                        file: "apply_context.cpp".to_string(),
                        line_number: 124,
                        method: "exec_one".to_string(),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_backend_error_reachable_at_any_depth() {
        let rpc = sample_backend_error();
        let deep = Error::broadcast("node rejected transaction", Some(Error::Rpc(rpc.clone())));
        let deeper = Error::sign("wrapped again", Some(deep));

        let found = extract_backend_error(&deeper).expect("backend error should be found");
        assert_eq!(found.error.code, 3050003);
        assert_eq!(found.error.details.len(), 2);

        // Starting at the wrapping node itself also works.
        let direct = Error::Rpc(rpc);
        assert!(extract_backend_error(&direct).is_some());
    }

    #[test]
    fn test_no_backend_error_in_chain() {
        let err = Error::prepare(
            "abi lookup failed",
            Some(Error::serialization("unknown type: widget")),
        );
        assert!(extract_backend_error(&err).is_none());
    }

    #[test]
    fn test_find_cause_by_kind() {
        let err = Error::broadcast(
            "outer",
            Some(Error::Transport {
                message: "connection refused".to_string(),
                source: None,
            }),
        );
        let found = find_cause(&err, |node| {
            matches!(node.downcast_ref::<Error>(), Some(Error::Transport { .. }))
        });
        assert!(found.is_some());

        let missed = find_cause(&err, |node| node.downcast_ref::<RpcResponseError>().is_some());
        assert!(missed.is_none());
    }

    #[test]
    fn test_format_backend_message_deterministic() {
        let rpc = sample_backend_error();
        let first = format_backend_message(&rpc);
        let second = format_backend_message(&rpc);
        assert_eq!(first, second);
        assert_eq!(
            first,
            "Internal Service Error - Code: 3050003 - \
             assertion failure with message: overdrawn balance - \
             pending console output:"
        );
    }

    #[test]
    fn test_format_backend_message_without_details() {
        let rpc = RpcResponseError {
            code: 401,
            message: "Unauthorized".to_string(),
            error: BackendError::default(),
        };
        assert_eq!(format_backend_message(&rpc), "Unauthorized - Code: 0");
    }

    #[test]
    fn test_rpc_response_error_parses_node_body() {
        let body = r#"{
            "code": 500,
            "message": "Internal Service Error",
            "error": {
                "code": 3040005,
                "name": "expired_tx_exception",
                "what": "Expired Transaction",
                "details": [
                    {
                        "message": "expired transaction",
                        "file": "producer_plugin.cpp",
                        "line_number": 380,
                        "method": "process_incoming_transaction_async"
                    }
                ]
            }
        }"#;
        let parsed: RpcResponseError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, 500);
        assert_eq!(parsed.error.name, "expired_tx_exception");
        assert_eq!(parsed.error.details[0].line_number, 380);
    }
}
