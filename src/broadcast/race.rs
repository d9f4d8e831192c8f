//! Parallel broadcast race.
//!
//! # Behaviour
//! ```text
//! spawn push_transaction on every endpoint ──┐
//!                                            ├─ first confirmed inclusion → Ok, abort the rest
//! deadline timer ────────────────────────────┤─ elapsed first             → BroadcastTimeout
//!                                            ├─ validation rejection      → TransactionRejected
//!                                            └─ every attempt lost        → AllEndpointsFailed
//! ```
//!
//! Results are taken in arrival order, not configuration order. Dropping the
//! `JoinSet` aborts outstanding attempts; an HTTP call already in flight is
//! abandoned and its result never observed.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::broadcast::error::TransactError;
use crate::chain::types::{Confirmation, SignedTransaction};
use crate::observability::metrics;
use crate::rpc::client::ChainRpc;
use crate::rpc::error::RpcError;

/// Default deadline for the whole race.
pub const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_secs(10);

/// Loose inclusion check: the response mentions both an authorization and a
/// block number somewhere. Endpoints disagree on the exact response shape.
pub fn is_confirmed(response: &Value) -> bool {
    let text = response.to_string().replace('\\', "");
    text.contains("authorization") && text.contains("block_num")
}

type AttemptResult = (String, Result<Value, RpcError>);

/// Push `tx` to every endpoint at once and return the first confirmation.
pub async fn race_broadcast(
    endpoints: &[Arc<dyn ChainRpc>],
    tx: &SignedTransaction,
    timeout: Duration,
) -> Result<Confirmation, TransactError> {
    let started = Instant::now();
    let tx = Arc::new(tx.clone());

    let mut attempts = JoinSet::new();
    for endpoint in endpoints {
        let endpoint = Arc::clone(endpoint);
        let tx = Arc::clone(&tx);
        attempts.spawn(async move {
            let result = endpoint.push_transaction(&tx).await;
            (endpoint.url().to_string(), result)
        });
    }

    let outcome = match tokio::time::timeout(timeout, first_confirmation(&mut attempts)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                endpoints = endpoints.len(),
                "No endpoint confirmed before the deadline"
            );
            Err(TransactError::BroadcastTimeout { timeout })
        }
    };
    attempts.abort_all();

    match &outcome {
        Ok(confirmation) => {
            tracing::info!(
                endpoint = %confirmation.endpoint,
                transaction_id = confirmation.transaction_id().unwrap_or("unknown"),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Transaction confirmed"
            );
            metrics::record_broadcast("confirmed", started);
        }
        Err(e) => metrics::record_broadcast(e.label(), started),
    }
    outcome
}

/// Drain attempts in completion order until one qualifies.
async fn first_confirmation(
    attempts: &mut JoinSet<AttemptResult>,
) -> Result<Confirmation, TransactError> {
    let attempted = attempts.len();

    while let Some(joined) = attempts.join_next().await {
        match joined {
            Ok((endpoint, Ok(response))) if is_confirmed(&response) => {
                return Ok(Confirmation { endpoint, response });
            }
            Ok((endpoint, Ok(_))) => {
                tracing::warn!(endpoint = %endpoint, "Push response did not confirm inclusion");
            }
            Ok((endpoint, Err(e))) if e.is_fatal_rejection() => {
                tracing::error!(endpoint = %endpoint, error = %e, "Transaction rejected");
                return Err(TransactError::TransactionRejected {
                    endpoint,
                    source: e,
                });
            }
            Ok((endpoint, Err(e))) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Push failed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Push task failed");
            }
        }
    }

    Err(TransactError::AllEndpointsFailed { attempted })
}
