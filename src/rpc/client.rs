//! Endpoint client for the `/v1/chain` HTTP API.
//!
//! # Responsibilities
//! - Perform the four calls the broadcaster needs against ONE endpoint
//! - Classify failures (transport, status, malformed body, node error)
//! - Reuse a caller-supplied HTTP session, or build a transient one per call
//!
//! No retries happen here; failover belongs to the resolver and the race.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::chain::types::{ChainId, HeadBlockInfo, Name, SignedTransaction};
use crate::observability::metrics;
use crate::rpc::error::RpcError;
use crate::rpc::types::{
    AbiJsonToBinRequest, AbiJsonToBinResponse, ChainInfo, GetBlockRequest, GetBlockResponse,
    PushTransactionRequest,
};

/// Default transport timeout for transient sessions.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in [`RpcError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Calls the broadcaster makes against a single endpoint.
///
/// Implementations must be `Send + Sync`; the broadcast race moves
/// `Arc<dyn ChainRpc>` handles into spawned tasks.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Base URL identifying this endpoint.
    fn url(&self) -> &str;

    /// Current head block number and its ref block prefix.
    async fn get_head_block(&self) -> Result<HeadBlockInfo, RpcError>;

    /// Identifier of the network this endpoint serves.
    async fn get_chain_id(&self) -> Result<ChainId, RpcError>;

    /// ABI-encode JSON action arguments.
    async fn abi_json_to_bin(
        &self,
        account: Name,
        action: Name,
        args: &Value,
    ) -> Result<Vec<u8>, RpcError>;

    /// Submit a signed transaction and return the node's response as-is.
    async fn push_transaction(&self, tx: &SignedTransaction) -> Result<Value, RpcError>;
}

/// HTTP endpoint handle.
#[derive(Clone)]
pub struct HttpEndpoint {
    base_url: String,
    /// Shared session owned by the caller. Never closed here.
    session: Option<reqwest::Client>,
    request_timeout: Duration,
}

impl HttpEndpoint {
    /// Endpoint that opens a transient connection for each call.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Endpoint that reuses the caller's session for every call.
    pub fn with_session(base_url: impl Into<String>, session: reqwest::Client) -> Self {
        Self {
            session: Some(session),
            ..Self::new(base_url)
        }
    }

    /// Transport timeout applied to transient sessions.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `get_info` of this endpoint.
    pub async fn get_info(&self) -> Result<ChainInfo, RpcError> {
        self.post("/chain/get_info", &json!({})).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RpcError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let result = self
            .post_value(path, body)
            .await
            .and_then(|value| {
                serde_json::from_value(value).map_err(|e| RpcError::Malformed(e.to_string()))
            });

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.label(),
        };
        metrics::record_rpc_call(&self.base_url, path, outcome);
        result
    }

    async fn post_value<B>(&self, path: &str, body: &B) -> Result<Value, RpcError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}/v1{}", self.base_url, path);
        tracing::trace!(url = %url, "POST");

        let response = match &self.session {
            Some(session) => session.post(&url).json(body).send().await,
            None => {
                let transient = reqwest::Client::builder()
                    .timeout(self.request_timeout)
                    .build()
                    .map_err(|e| RpcError::Transport(e.to_string()))?;
                transient.post(&url).json(body).send().await
            }
        }
        .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        interpret_response(status, &text)
    }
}

/// Classify a raw HTTP response.
///
/// A node reports errors with status 500 and/or a `"code": 500` body; both are
/// treated as a node error regardless of the other.
pub(crate) fn interpret_response(status: u16, text: &str) -> Result<Value, RpcError> {
    let success = (200..300).contains(&status);

    let body: Value = match serde_json::from_str(text) {
        Ok(body) => body,
        Err(e) if success => return Err(RpcError::Malformed(e.to_string())),
        Err(_) => {
            return Err(RpcError::Status {
                status,
                body: truncate(text),
            })
        }
    };

    let code_500 = body.get("code").and_then(Value::as_u64) == Some(500);
    if status == 500 || code_500 || (!success && body.get("error").is_some()) {
        return Err(RpcError::from_error_body(&body));
    }
    if !success {
        return Err(RpcError::Status {
            status,
            body: truncate(text),
        });
    }

    Ok(body)
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl ChainRpc for HttpEndpoint {
    fn url(&self) -> &str {
        &self.base_url
    }

    async fn get_head_block(&self) -> Result<HeadBlockInfo, RpcError> {
        let info = self.get_info().await?;
        let block: GetBlockResponse = self
            .post(
                "/chain/get_block",
                &GetBlockRequest {
                    block_num_or_id: info.head_block_num,
                },
            )
            .await?;

        Ok(HeadBlockInfo {
            block_num: block.block_num,
            ref_block_prefix: block.ref_block_prefix,
        })
    }

    async fn get_chain_id(&self) -> Result<ChainId, RpcError> {
        let info = self.get_info().await?;
        ChainId::from_hex(&info.chain_id)
            .map_err(|e| RpcError::Malformed(format!("chain_id: {e}")))
    }

    async fn abi_json_to_bin(
        &self,
        account: Name,
        action: Name,
        args: &Value,
    ) -> Result<Vec<u8>, RpcError> {
        let response: AbiJsonToBinResponse = self
            .post(
                "/chain/abi_json_to_bin",
                &AbiJsonToBinRequest {
                    code: account,
                    action,
                    args,
                },
            )
            .await?;

        hex::decode(&response.binargs).map_err(|e| RpcError::Malformed(format!("binargs: {e}")))
    }

    async fn push_transaction(&self, tx: &SignedTransaction) -> Result<Value, RpcError> {
        self.post(
            "/chain/push_transaction",
            &PushTransactionRequest {
                signatures: &tx.signatures,
                compression: 0,
                packed_context_free_data: "",
                packed_trx: &tx.packed_trx,
            },
        )
        .await
    }
}

impl std::fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpoint")
            .field("base_url", &self.base_url)
            .field("shared_session", &self.session.is_some())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
