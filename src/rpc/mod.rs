//! RPC provider: node endpoints and their wire types
//!
//! Stateless request/response mapping to the node's `/v1/chain` endpoints.
//! Rows returned by the table queries are passed through exactly as the node
//! sent them; interpreting row contents is the ABI-aware layer's job.

mod http;

pub use http::HttpRpcProvider;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use crate::error::Error;
use crate::types::{PackedTransaction, Transaction};

/// Node chain state summary (`get_info`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetInfoResponse {
    #[serde(default)]
    pub server_version: String,
    pub chain_id: String,
    pub head_block_num: u64,
    pub last_irreversible_block_num: u64,
    #[serde(default)]
    pub last_irreversible_block_id: String,
    pub head_block_id: String,
    pub head_block_time: String,
    #[serde(default)]
    pub head_block_producer: String,
    #[serde(default)]
    pub virtual_block_cpu_limit: u64,
    #[serde(default)]
    pub virtual_block_net_limit: u64,
    #[serde(default)]
    pub block_cpu_limit: u64,
    #[serde(default)]
    pub block_net_limit: u64,
}

/// Reference block data (`get_block`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetBlockResponse {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub confirmed: u32,
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub id: String,
    pub block_num: u64,
    pub ref_block_prefix: u32,
}

/// Request body for `get_required_keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequiredKeysRequest {
    pub transaction: Transaction,
    pub available_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRequiredKeysResponse {
    #[serde(default)]
    pub required_keys: Vec<String>,
}

/// Raw (binary, base64-encoded) contract ABI (`get_raw_abi`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRawAbiResponse {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub code_hash: String,
    #[serde(default)]
    pub abi_hash: String,
    #[serde(default)]
    pub abi: String,
}

/// Result of a successful `push_transaction`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendTransactionResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub processed: TransactionTrace,
}

/// Server-reported execution trace of a broadcast transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionTrace {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub block_num: u64,
    #[serde(default)]
    pub block_time: String,
    #[serde(default)]
    pub receipt: Option<Value>,
    #[serde(default)]
    pub elapsed: i64,
    #[serde(default)]
    pub net_usage: i64,
    #[serde(default)]
    pub action_traces: Vec<ActionTrace>,
}

/// One action's execution trace, including console output and the raw
/// return value bytes (opaque until decoded against the ABI).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionTrace {
    #[serde(default)]
    pub action_ordinal: u32,
    #[serde(default)]
    pub creator_action_ordinal: u32,
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub act: ActTraceBody,
    #[serde(default)]
    pub console: String,
    #[serde(default)]
    pub elapsed: i64,
    #[serde(default)]
    pub return_value_hex_data: Option<String>,
}

/// The `act` payload inside an action trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActTraceBody {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub authorization: Vec<crate::types::Authorization>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub hex_data: Option<String>,
}

/// Query parameters for `get_table_rows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTableRowsRequest {
    pub json: bool,
    pub code: String,
    pub scope: String,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    pub limit: u32,
    pub reverse: bool,
    pub show_payer: bool,
}

impl GetTableRowsRequest {
    pub fn new(code: impl Into<String>, scope: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            json: true,
            code: code.into(),
            scope: scope.into(),
            table: table.into(),
            lower_bound: None,
            upper_bound: None,
            index_position: None,
            key_type: None,
            limit: 10,
            reverse: false,
            show_payer: false,
        }
    }

    pub fn with_bounds(
        mut self,
        lower: impl Into<String>,
        upper: impl Into<String>,
    ) -> Self {
        self.lower_bound = Some(lower.into());
        self.upper_bound = Some(upper.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_index(
        mut self,
        index_position: impl Into<String>,
        key_type: impl Into<String>,
    ) -> Self {
        self.index_position = Some(index_position.into());
        self.key_type = Some(key_type.into());
        self
    }
}

/// Rows from `get_table_rows`, exactly as the node returned them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTableRowsResponse {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub next_key: Option<String>,
}

/// Query parameters for `get_kv_table_rows`. Pure pass-through: the
/// provider performs no interpretation of bounds or row contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetKvTableRowsRequest {
    pub json: bool,
    pub code: String,
    pub table: String,
    pub encode_type: String,
    pub index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    pub limit: u32,
    pub reverse: bool,
}

impl GetKvTableRowsRequest {
    /// Query by index name with `name`-encoded bounds.
    pub fn new(
        code: impl Into<String>,
        table: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            json: true,
            code: code.into(),
            table: table.into(),
            encode_type: "name".to_string(),
            index_name: index_name.into(),
            index_value: None,
            lower_bound: None,
            upper_bound: None,
            limit: 10,
            reverse: false,
        }
    }

    pub fn with_encode_type(mut self, encode_type: impl Into<String>) -> Self {
        self.encode_type = encode_type.into();
        self
    }

    pub fn with_index_value(mut self, value: impl Into<String>) -> Self {
        self.index_value = Some(value.into());
        self
    }

    pub fn with_lower_bound(mut self, bound: impl Into<String>) -> Self {
        self.lower_bound = Some(bound.into());
        self
    }

    pub fn with_upper_bound(mut self, bound: impl Into<String>) -> Self {
        self.upper_bound = Some(bound.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Rows from `get_kv_table_rows`. Rows stay in the node's serialized form
/// (hex strings) and are never decoded by this layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetKvTableRowsResponse {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub next_key: Option<String>,
}

/// Stateless mapping to the node's chain endpoints.
///
/// Implementations must surface backend-reported failures as structured
/// [`crate::error::RpcResponseError`]s and keep transport failures a
/// distinct error kind. No implicit retries.
pub trait RpcProvider: Send + Sync {
    fn get_info(&self) -> impl Future<Output = Result<GetInfoResponse, Error>> + Send;

    fn get_block(
        &self,
        block_num_or_id: &str,
    ) -> impl Future<Output = Result<GetBlockResponse, Error>> + Send;

    fn get_required_keys(
        &self,
        request: &GetRequiredKeysRequest,
    ) -> impl Future<Output = Result<GetRequiredKeysResponse, Error>> + Send;

    fn get_raw_abi(
        &self,
        account: &str,
    ) -> impl Future<Output = Result<GetRawAbiResponse, Error>> + Send;

    fn push_transaction(
        &self,
        transaction: &PackedTransaction,
    ) -> impl Future<Output = Result<SendTransactionResponse, Error>> + Send;

    fn get_table_rows(
        &self,
        request: &GetTableRowsRequest,
    ) -> impl Future<Output = Result<GetTableRowsResponse, Error>> + Send;

    fn get_kv_table_rows(
        &self,
        request: &GetKvTableRowsRequest,
    ) -> impl Future<Output = Result<GetKvTableRowsResponse, Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_transaction_response_parses() {
        let body = json!({
            "transaction_id": "0bd69f3d4e279f1f10b73e8fa3d1especial",
            "processed": {
                "id": "0bd69f3d4e279f1f10b73e8fa3d1especial",
                "block_num": 12345,
                "block_time": "2021-06-01T12:00:00.500",
                "elapsed": 185,
                "net_usage": 144,
                "action_traces": [{
                    "action_ordinal": 1,
                    "creator_action_ordinal": 0,
                    "receiver": "returnvalue",
                    "act": {
                        "account": "returnvalue",
                        "name": "actionresret",
                        "authorization": [{"actor": "bob", "permission": "active"}],
                        "data": {},
                        "hex_data": ""
                    },
                    "console": "",
                    "elapsed": 82,
                    "return_value_hex_data": "0000000000002440"
                }]
            }
        });
        let response: SendTransactionResponse = serde_json::from_value(body).unwrap();
        assert!(!response.transaction_id.is_empty());
        let trace = &response.processed.action_traces[0];
        assert_eq!(trace.act.name, "actionresret");
        assert_eq!(trace.return_value_hex_data.as_deref(), Some("0000000000002440"));
    }

    #[test]
    fn test_response_tolerates_missing_optional_fields() {
        let response: SendTransactionResponse =
            serde_json::from_value(json!({"transaction_id": "abc"})).unwrap();
        assert!(response.processed.action_traces.is_empty());

        let trace: ActionTrace = serde_json::from_value(json!({"receiver": "x"})).unwrap();
        assert!(trace.return_value_hex_data.is_none());
    }

    #[test]
    fn test_kv_request_wire_shape() {
        let request = GetKvTableRowsRequest::new("kvaddrbook", "kvaddrbook", "accname")
            .with_lower_bound("jane");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "json": true,
                "code": "kvaddrbook",
                "table": "kvaddrbook",
                "encode_type": "name",
                "index_name": "accname",
                "lower_bound": "jane",
                "limit": 10,
                "reverse": false
            })
        );
    }

    #[test]
    fn test_kv_rows_pass_through_untouched() {
        // Serialized rows from a live node; the provider must hand these
        // back byte-for-byte without decoding.
        let body = json!({
            "rows": [
                "0000000000a0a679044a616e6503446f650d31323334204d79",
                "0000000000301b7d044a6f686e05536d6974680c313233204d"
            ],
            "more": false
        });
        let response: GetKvTableRowsResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(
            response.rows[0],
            json!("0000000000a0a679044a616e6503446f650d31323334204d79")
        );
        assert_eq!(serde_json::to_value(&response.rows).unwrap(), body["rows"]);
    }

    #[test]
    fn test_table_rows_request_defaults() {
        let request = GetTableRowsRequest::new("eosio.token", "bob", "accounts");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["json"], json!(true));
        assert_eq!(value["limit"], json!(10));
        // Unset bounds are omitted from the wire entirely.
        assert!(value.get("lower_bound").is_none());
    }
}
