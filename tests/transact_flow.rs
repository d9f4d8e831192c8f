//! End-to-end `transact` against mock nodes over real HTTP.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wax_broadcast::chain::{Action, K1Signer, Name, PermissionLevel};
use wax_broadcast::config::BroadcasterConfig;
use wax_broadcast::rpc::RpcError;
use wax_broadcast::{Broadcaster, TransactError};

mod common;
use common::{dead_endpoint, MockNode, NodeBehavior, DEV_KEY};

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

fn transfer() -> Action {
    Action::new(
        name("eosio.token"),
        name("transfer"),
        vec![PermissionLevel::new(name("alice"), name("active"))],
        json!({"from": "alice", "to": "eosio", "quantity": "0.01000000 WAX", "memo": "test"}),
    )
}

fn broadcaster(urls: Vec<String>, timeout_secs: u64, session: Option<reqwest::Client>) -> Broadcaster {
    let mut config = BroadcasterConfig::default();
    config.endpoints = urls;
    config.account.name = "alice".into();
    config.broadcast.timeout_secs = timeout_secs;
    config.rpc.request_timeout_secs = 2;

    let signer = K1Signer::from_key_str(DEV_KEY).unwrap();
    Broadcaster::from_config(&config, Arc::new(signer), session)
}

#[tokio::test]
async fn test_fastest_node_confirms_with_failover_reference() {
    let behaviors = [
        NodeBehavior::healthy(1)
            .reads_failing()
            .push_after(Duration::from_millis(600)),
        NodeBehavior::healthy(2).push_after(Duration::from_millis(400)),
        NodeBehavior::healthy(3).push_after(Duration::from_millis(100)),
    ];
    let node2_binargs = behaviors[1].binargs();
    let mut nodes = Vec::new();
    for behavior in behaviors {
        nodes.push(MockNode::start(behavior).await);
    }

    let urls = nodes.iter().map(|n| n.url.clone()).collect();
    let confirmation = broadcaster(urls, 10, Some(reqwest::Client::new()))
        .transact(vec![transfer()])
        .await
        .unwrap();

    assert_eq!(confirmation.endpoint, nodes[2].url);
    assert_eq!(confirmation.block_num(), Some(1004));

    tokio::time::sleep(Duration::from_millis(50)).await;

    // node 1 could not serve reference data and was skipped for reads only
    assert_eq!(nodes[0].paths(), vec!["get_info", "push_transaction"]);
    assert_eq!(
        nodes[1].paths(),
        vec!["get_info", "get_block", "get_info", "abi_json_to_bin", "push_transaction"]
    );
    assert_eq!(nodes[2].paths(), vec!["push_transaction"]);

    // identical payload everywhere
    let pushed = nodes[1].pushes()[0].clone();
    for node in &nodes {
        assert_eq!(node.pushes(), vec![pushed.clone()]);
    }

    let packed_trx = pushed["packed_trx"].as_str().unwrap();
    assert!(packed_trx.contains(&node2_binargs));
    // ref_block_num 1002 little-endian after the 4-byte expiration
    assert_eq!(&packed_trx[8..12], "ea03");
    assert_eq!(pushed["compression"], 0);
    assert_eq!(pushed["packed_context_free_data"], "");

    let signatures = pushed["signatures"].as_array().unwrap();
    assert_eq!(signatures.len(), 1);
    assert!(signatures[0].as_str().unwrap().starts_with("SIG_K1_"));
}

#[tokio::test]
async fn test_no_reachable_endpoint_means_no_push() {
    let failing = MockNode::start(NodeBehavior::healthy(1).reads_failing()).await;
    let urls = vec![dead_endpoint().await, failing.url.clone()];

    let err = broadcaster(urls, 10, None)
        .transact(vec![transfer()])
        .await
        .unwrap_err();

    assert!(matches!(err, TransactError::NoReachableEndpoint { attempted: 2 }));
    assert!(failing.pushes().is_empty());
}

#[tokio::test]
async fn test_assertion_rejection_is_reported() {
    let rejecting = MockNode::start(
        NodeBehavior::healthy(1).rejecting("eosio_assert_message_exception"),
    )
    .await;
    let slow = MockNode::start(NodeBehavior::healthy(2).push_after(Duration::from_secs(3))).await;

    let started = Instant::now();
    let err = broadcaster(vec![rejecting.url.clone(), slow.url.clone()], 10, None)
        .transact(vec![transfer()])
        .await
        .unwrap_err();

    match err {
        TransactError::TransactionRejected { endpoint, source } => {
            assert_eq!(endpoint, rejecting.url);
            assert!(matches!(source, RpcError::Remote { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_duplicate_everywhere_is_all_failed() {
    let a = MockNode::start(NodeBehavior::healthy(1).rejecting("tx_duplicate")).await;
    let b = MockNode::start(NodeBehavior::healthy(2).rejecting("tx_duplicate")).await;

    let err = broadcaster(vec![a.url.clone(), b.url.clone()], 10, None)
        .transact(vec![transfer()])
        .await
        .unwrap_err();

    assert!(matches!(err, TransactError::AllEndpointsFailed { attempted: 2 }));
}

#[tokio::test]
async fn test_slow_nodes_time_out() {
    let a = MockNode::start(NodeBehavior::healthy(1).push_after(Duration::from_secs(5))).await;
    let b = MockNode::start(NodeBehavior::healthy(2).push_after(Duration::from_secs(5))).await;

    let started = Instant::now();
    let err = broadcaster(vec![a.url.clone(), b.url.clone()], 1, Some(reqwest::Client::new()))
        .transact(vec![transfer()])
        .await
        .unwrap_err();

    assert!(
        matches!(err, TransactError::BroadcastTimeout { timeout } if timeout == Duration::from_secs(1))
    );
    assert!(started.elapsed() < Duration::from_secs(4));
}
