//! Shared utilities for integration testing: a scriptable mock chain node.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// WAX testnet chain id.
pub const TESTNET_CHAIN_ID: &str = "f16b1833c747c43682f4386fca9cbb327929334a762755ebec17f6f23c9b8a12";

/// Throwaway development key. Never holds funds.
pub const DEV_KEY: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";

/// What a push_transaction call answers.
#[derive(Debug, Clone)]
pub enum PushReply {
    Included,
    Rejected(&'static str),
}

/// Scripted behaviour of one node.
#[derive(Debug, Clone)]
pub struct NodeBehavior {
    pub tag: u8,
    pub head_block_num: u32,
    pub reads_fail: bool,
    pub push_delay: Duration,
    pub push_reply: PushReply,
}

impl NodeBehavior {
    pub fn healthy(tag: u8) -> Self {
        Self {
            tag,
            head_block_num: 1000 + tag as u32,
            reads_fail: false,
            push_delay: Duration::ZERO,
            push_reply: PushReply::Included,
        }
    }

    /// get_info answers 502, so the node cannot supply reference data.
    pub fn reads_failing(mut self) -> Self {
        self.reads_fail = true;
        self
    }

    pub fn push_after(mut self, delay: Duration) -> Self {
        self.push_delay = delay;
        self
    }

    pub fn rejecting(mut self, name: &'static str) -> Self {
        self.push_reply = PushReply::Rejected(name);
        self
    }

    /// ABI encoding this node hands out, so tests can tell nodes apart.
    pub fn binargs(&self) -> String {
        format!("b1{:02x}", self.tag)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

/// Mock node listening on an ephemeral local port.
pub struct MockNode {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockNode {
    pub async fn start(behavior: NodeBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let behavior = Arc::new(behavior);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let behavior = behavior.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            serve(socket, &behavior, &recorded).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.trim_start_matches("/v1/chain/").to_string())
            .collect()
    }

    pub fn pushes(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.ends_with("push_transaction"))
            .map(|r| r.body.clone())
            .collect()
    }
}

/// URL of a port with nothing listening.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(
    mut socket: TcpStream,
    behavior: &NodeBehavior,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let Some((path, body)) = read_request(&mut socket).await else {
        return;
    };
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    recorded.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        body: body.clone(),
    });

    let (status, reply) = respond(behavior, &path, &body).await;
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        _ => "200 OK",
    };
    let reply = reply.to_string();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        reply.len(),
        reply
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn respond(behavior: &NodeBehavior, path: &str, body: &Value) -> (u16, Value) {
    match path {
        "/v1/chain/get_info" if behavior.reads_fail => (502, json!({"message": "bad gateway"})),
        "/v1/chain/get_info" => (
            200,
            json!({
                "server_version_string": "v4.0.4-mock",
                "chain_id": TESTNET_CHAIN_ID,
                "head_block_num": behavior.head_block_num,
                "last_irreversible_block_num": behavior.head_block_num - 300,
            }),
        ),
        "/v1/chain/get_block" => {
            let block_num = body["block_num_or_id"].as_u64().unwrap_or(0);
            (
                200,
                json!({"block_num": block_num, "ref_block_prefix": 0x0a0b_0c0du32, "producer": "mock"}),
            )
        }
        "/v1/chain/abi_json_to_bin" => (200, json!({"binargs": behavior.binargs()})),
        "/v1/chain/push_transaction" => {
            tokio::time::sleep(behavior.push_delay).await;
            match behavior.push_reply {
                PushReply::Included => (
                    200,
                    json!({
                        "transaction_id": format!("{:064x}", behavior.tag),
                        "processed": {
                            "block_num": behavior.head_block_num + 1,
                            "action_traces": [{
                                "act": {"authorization": [{"actor": "alice", "permission": "active"}]}
                            }]
                        }
                    }),
                ),
                PushReply::Rejected(name) => (
                    500,
                    json!({
                        "code": 500,
                        "message": "Internal Service Error",
                        "error": {"code": 3050003, "name": name, "what": name, "details": []}
                    }),
                ),
            }
        }
        _ => (404, json!({"code": 404, "message": "Not Found"})),
    }
}

/// Read one HTTP request, returning its path and body.
async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.split_whitespace().nth(1)?.to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[body_start..body_start + content_length]).to_string();
    Some((path, body))
}
