//! Reference data resolution with sequential failover.
//!
//! Endpoints are tried strictly in configuration order. For each one the
//! head block, the chain id and every pending action encoding must all come
//! from that same endpoint; the first endpoint that delivers the full set wins.

use std::sync::Arc;

use crate::broadcast::error::TransactError;
use crate::chain::types::{Action, ActionData, ChainId, HeadBlockInfo};
use crate::observability::metrics;
use crate::rpc::client::ChainRpc;
use crate::rpc::error::RpcError;

/// Reference data obtained from a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference {
    /// URL of the endpoint that supplied everything below.
    pub endpoint: String,
    pub head_block: HeadBlockInfo,
    pub chain_id: ChainId,
}

/// Resolve reference data and encode every structured action in place.
///
/// `actions` is only modified once an endpoint has completed the whole
/// sequence; encodings from abandoned endpoints are dropped.
pub async fn resolve_reference(
    endpoints: &[Arc<dyn ChainRpc>],
    actions: &mut [Action],
) -> Result<ResolvedReference, TransactError> {
    for (idx, endpoint) in endpoints.iter().enumerate() {
        match fetch_from(endpoint.as_ref(), actions).await {
            Ok((head_block, chain_id, encoded)) => {
                for (i, bytes) in encoded {
                    actions[i].data = ActionData::Raw(bytes);
                }

                tracing::debug!(
                    endpoint = endpoint.url(),
                    block_num = head_block.block_num,
                    attempts = idx + 1,
                    "Reference data resolved"
                );
                metrics::record_resolution(idx + 1, true);

                return Ok(ResolvedReference {
                    endpoint: endpoint.url().to_string(),
                    head_block,
                    chain_id,
                });
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = endpoint.url(),
                    error = %e,
                    "Reference resolution failed, trying next endpoint"
                );
            }
        }
    }

    metrics::record_resolution(endpoints.len(), false);
    Err(TransactError::NoReachableEndpoint {
        attempted: endpoints.len(),
    })
}

type Fetched = (HeadBlockInfo, ChainId, Vec<(usize, Vec<u8>)>);

async fn fetch_from(endpoint: &dyn ChainRpc, actions: &[Action]) -> Result<Fetched, RpcError> {
    let head_block = endpoint.get_head_block().await?;
    let chain_id = endpoint.get_chain_id().await?;

    let mut encoded = Vec::new();
    for (i, action) in actions.iter().enumerate() {
        if let ActionData::Structured(args) = &action.data {
            let bytes = endpoint
                .abi_json_to_bin(action.account, action.name, args)
                .await?;
            encoded.push((i, bytes));
        }
    }

    Ok((head_block, chain_id, encoded))
}
