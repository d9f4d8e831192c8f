//! Scriptable in-memory endpoint for unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::chain::types::{ChainId, HeadBlockInfo, Name, SignedTransaction};
use crate::rpc::client::ChainRpc;
use crate::rpc::error::{RemoteErrorKind, RpcError};

/// Response body that passes the inclusion check.
pub(crate) fn included_response(tag: u8) -> Value {
    json!({
        "transaction_id": format!("tx-{tag}"),
        "processed": {
            "block_num": 1000 + tag as u64,
            "action_traces": [{"act": {"authorization": [{"actor": "alice", "permission": "active"}]}}]
        }
    })
}

pub(crate) fn unreachable() -> RpcError {
    RpcError::Transport("connection refused".to_string())
}

pub(crate) fn rejection(kind_name: &str) -> RpcError {
    RpcError::Remote {
        kind: RemoteErrorKind::from_name(kind_name),
        code: Some(3050003),
        message: kind_name.to_string(),
    }
}

/// Every value this endpoint produces carries its `tag`, so tests can tell
/// which endpoint a chain id or encoding came from.
pub(crate) struct MockEndpoint {
    url: String,
    tag: u8,
    head_block: Result<HeadBlockInfo, RpcError>,
    chain_id_fails: bool,
    /// Fail the n-th (0-based) encode call and every later one.
    encode_fails_from: Option<usize>,
    push_delay: Duration,
    push_result: Result<Value, RpcError>,
    pub calls: Mutex<Vec<&'static str>>,
    encodes: AtomicUsize,
    /// Pushes that ran to completion (past their delay).
    pub completed_pushes: AtomicUsize,
    pub pushed: Mutex<Vec<SignedTransaction>>,
}

impl MockEndpoint {
    pub fn new(tag: u8) -> Self {
        Self {
            url: format!("http://node-{tag}"),
            tag,
            head_block: Ok(HeadBlockInfo {
                block_num: 100 + tag as u32,
                ref_block_prefix: tag as u32,
            }),
            chain_id_fails: false,
            encode_fails_from: None,
            push_delay: Duration::ZERO,
            push_result: Ok(included_response(tag)),
            calls: Mutex::new(Vec::new()),
            encodes: AtomicUsize::new(0),
            completed_pushes: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub fn head_block(mut self, result: Result<HeadBlockInfo, RpcError>) -> Self {
        self.head_block = result;
        self
    }

    pub fn failing_chain_id(mut self) -> Self {
        self.chain_id_fails = true;
        self
    }

    pub fn failing_encode_from(mut self, n: usize) -> Self {
        self.encode_fails_from = Some(n);
        self
    }

    pub fn push(mut self, delay: Duration, result: Result<Value, RpcError>) -> Self {
        self.push_delay = delay;
        self.push_result = result;
        self
    }

    pub fn chain_id_for(tag: u8) -> ChainId {
        ChainId::new(vec![tag; 32])
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChainRpc for MockEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_head_block(&self) -> Result<HeadBlockInfo, RpcError> {
        self.record("get_head_block");
        self.head_block.clone()
    }

    async fn get_chain_id(&self) -> Result<ChainId, RpcError> {
        self.record("get_chain_id");
        if self.chain_id_fails {
            return Err(unreachable());
        }
        Ok(Self::chain_id_for(self.tag))
    }

    async fn abi_json_to_bin(
        &self,
        _account: Name,
        _action: Name,
        _args: &Value,
    ) -> Result<Vec<u8>, RpcError> {
        self.record("abi_json_to_bin");
        let n = self.encodes.fetch_add(1, Ordering::SeqCst);
        if self.encode_fails_from.is_some_and(|from| n >= from) {
            return Err(rejection("abi_not_found_exception"));
        }
        Ok(vec![self.tag, n as u8])
    }

    async fn push_transaction(&self, tx: &SignedTransaction) -> Result<Value, RpcError> {
        self.record("push_transaction");
        self.pushed.lock().unwrap().push(tx.clone());
        tokio::time::sleep(self.push_delay).await;
        self.completed_pushes.fetch_add(1, Ordering::SeqCst);
        self.push_result.clone()
    }
}
