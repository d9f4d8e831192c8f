//! Errors surfaced by `Broadcaster::transact`.

use std::time::Duration;
use thiserror::Error;

use crate::chain::serializer::SerializeError;
use crate::chain::signer::SignError;
use crate::rpc::error::RpcError;

/// Failure to turn resolved reference data into a signed transaction.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),

    #[error("signing failed: {0}")]
    Sign(#[from] SignError),
}

/// Outcome of a failed `transact` call.
///
/// Per-endpoint errors never appear here directly, only their aggregate effect.
#[derive(Debug, Error)]
pub enum TransactError {
    /// No endpoint completed head block, chain id and action encoding.
    #[error("failed to get reference data from any of the {attempted} endpoints")]
    NoReachableEndpoint { attempted: usize },

    /// No endpoint confirmed the transaction before the deadline.
    #[error("no endpoint confirmed the transaction within {timeout:?}")]
    BroadcastTimeout { timeout: Duration },

    /// Every submission failed before the deadline.
    #[error("all {attempted} endpoints failed to accept the transaction")]
    AllEndpointsFailed { attempted: usize },

    /// An endpoint rejected the transaction itself (assertion, authorization, expiry).
    #[error("transaction rejected by {endpoint}: {source}")]
    TransactionRejected {
        endpoint: String,
        #[source]
        source: RpcError,
    },

    #[error(transparent)]
    Assembly(#[from] AssembleError),
}

impl TransactError {
    /// Short label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoReachableEndpoint { .. } => "no_reachable_endpoint",
            Self::BroadcastTimeout { .. } => "timeout",
            Self::AllEndpointsFailed { .. } => "all_failed",
            Self::TransactionRejected { .. } => "rejected",
            Self::Assembly(_) => "assembly",
        }
    }
}
