//! Action and authorization types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An actor/permission pair granting signing authority for an action.
///
/// Order is preserved and significant: the sequence becomes part of the
/// signed payload. Duplicates are not rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

impl Authorization {
    pub fn new(actor: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.into(),
        }
    }

    /// Shorthand for the common `active` permission.
    pub fn active(actor: impl Into<String>) -> Self {
        Self::new(actor, "active")
    }
}

/// An action payload: either a structured value awaiting ABI encoding or
/// raw bytes already in the chain's binary form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionData {
    Json(Value),
    Raw(Vec<u8>),
}

/// A single requested contract invocation within a transaction.
///
/// Immutable once constructed; preparing a transaction computes the encoded
/// form separately instead of mutating the action in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Contract account the action belongs to.
    pub account: String,
    /// Action name within the contract.
    pub name: String,
    /// Ordered authorization list.
    pub authorization: Vec<Authorization>,
    /// Payload, structured or raw.
    pub data: ActionData,
}

impl Action {
    /// Create an action with a structured JSON payload.
    pub fn new(
        account: impl Into<String>,
        name: impl Into<String>,
        authorization: Vec<Authorization>,
        data: Value,
    ) -> Self {
        Self {
            account: account.into(),
            name: name.into(),
            authorization,
            data: ActionData::Json(data),
        }
    }

    /// Create an action whose payload is already binary-encoded.
    pub fn from_raw(
        account: impl Into<String>,
        name: impl Into<String>,
        authorization: Vec<Authorization>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            account: account.into(),
            name: name.into(),
            authorization,
            data: ActionData::Raw(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authorization_order_is_preserved() {
        let action = Action::new(
            "eosio.token",
            "transfer",
            vec![Authorization::active("bob"), Authorization::new("alice", "owner")],
            json!({}),
        );
        assert_eq!(action.authorization[0].actor, "bob");
        assert_eq!(action.authorization[0].permission, "active");
        assert_eq!(action.authorization[1].permission, "owner");
    }

    #[test]
    fn test_authorization_serde_shape() {
        let auth = Authorization::active("bob");
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json, json!({"actor": "bob", "permission": "active"}));
    }
}
