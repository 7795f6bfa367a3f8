//! HTTP implementation of the RPC provider

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    GetBlockResponse, GetInfoResponse, GetKvTableRowsRequest, GetKvTableRowsResponse,
    GetRawAbiResponse, GetRequiredKeysRequest, GetRequiredKeysResponse, GetTableRowsRequest,
    GetTableRowsResponse, RpcProvider, SendTransactionResponse,
};
use crate::error::{Error, RpcResponseError};
use crate::types::PackedTransaction;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP provider against a node's `/v1/chain` endpoints.
///
/// Performs exactly one request per call; timeout and retry policy stay
/// explicit and caller-visible.
pub struct HttpRpcProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRpcProvider {
    /// Create a provider for the given node base URL (e.g.
    /// `https://my.node:8888`) with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a provider with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Transport {
                message: "failed to build HTTP client".to_string(),
                source: Some(e),
            })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn call<Req: Serialize + ?Sized, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Req>,
    ) -> Result<Resp, Error> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(endpoint = path, "calling node");

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| Error::Transport {
            message: format!("request to {} failed: {}", path, e),
            source: Some(e),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::Transport {
            message: format!("could not read response from {}: {}", path, e),
            source: Some(e),
        })?;

        if !status.is_success() {
            return Err(backend_error_from(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| Error::Transport {
            message: format!("unexpected response body from {}: {}", path, e),
            source: None,
        })
    }
}

/// Map a non-2xx response into a structured backend error. Bodies that do
/// not parse as the node's error shape still become an [`RpcResponseError`]
/// built from the HTTP status, never a bare transport failure.
fn backend_error_from(status: StatusCode, body: &str) -> Error {
    match serde_json::from_str::<RpcResponseError>(body) {
        Ok(parsed) if parsed.code != 0 || !parsed.message.is_empty() => Error::Rpc(parsed),
        _ => {
            warn!(status = %status, "node returned an unparseable error body");
            Error::Rpc(RpcResponseError {
                code: u64::from(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("unrecognized node error")
                    .to_string(),
                error: Default::default(),
            })
        }
    }
}

impl RpcProvider for HttpRpcProvider {
    async fn get_info(&self) -> Result<GetInfoResponse, Error> {
        self.call::<(), _>("v1/chain/get_info", None).await
    }

    async fn get_block(&self, block_num_or_id: &str) -> Result<GetBlockResponse, Error> {
        let body = serde_json::json!({ "block_num_or_id": block_num_or_id });
        self.call("v1/chain/get_block", Some(&body)).await
    }

    async fn get_required_keys(
        &self,
        request: &GetRequiredKeysRequest,
    ) -> Result<GetRequiredKeysResponse, Error> {
        self.call("v1/chain/get_required_keys", Some(request)).await
    }

    async fn get_raw_abi(&self, account: &str) -> Result<GetRawAbiResponse, Error> {
        let body = serde_json::json!({ "account_name": account });
        self.call("v1/chain/get_raw_abi", Some(&body)).await
    }

    async fn push_transaction(
        &self,
        transaction: &PackedTransaction,
    ) -> Result<SendTransactionResponse, Error> {
        self.call("v1/chain/push_transaction", Some(transaction))
            .await
    }

    async fn get_table_rows(
        &self,
        request: &GetTableRowsRequest,
    ) -> Result<GetTableRowsResponse, Error> {
        self.call("v1/chain/get_table_rows", Some(request)).await
    }

    async fn get_kv_table_rows(
        &self,
        request: &GetKvTableRowsRequest,
    ) -> Result<GetKvTableRowsResponse, Error> {
        self.call("v1/chain/get_kv_table_rows", Some(request)).await
    }
}
