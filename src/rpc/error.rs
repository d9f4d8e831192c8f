//! Per-call endpoint errors.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Application-level error kinds reported by a node, keyed by error name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    AssertMessage,
    ActionValidate,
    MissingAuth,
    UnsatisfiedAuthorization,
    Expired,
    Duplicate,
    CpuUsageExceeded,
    NetUsageExceeded,
    RamUsageExceeded,
    Deadline,
    AccountQuery,
    UnknownBlock,
    Other(String),
}

impl RemoteErrorKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "eosio_assert_message_exception" | "eosio_assert_code_exception" => Self::AssertMessage,
            "action_validate_exception" => Self::ActionValidate,
            "missing_auth_exception" => Self::MissingAuth,
            "unsatisfied_authorization" => Self::UnsatisfiedAuthorization,
            "expired_tx_exception" => Self::Expired,
            "tx_duplicate" => Self::Duplicate,
            "tx_cpu_usage_exceeded" => Self::CpuUsageExceeded,
            "tx_net_usage_exceeded" => Self::NetUsageExceeded,
            "ram_usage_exceeded" => Self::RamUsageExceeded,
            "deadline_exception" | "leeway_deadline_exception" => Self::Deadline,
            "account_query_exception" => Self::AccountQuery,
            "unknown_block_exception" => Self::UnknownBlock,
            other => Self::Other(other.to_string()),
        }
    }

    /// The transaction itself is invalid; every node will reject it the same way.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AssertMessage
                | Self::ActionValidate
                | Self::MissingAuth
                | Self::UnsatisfiedAuthorization
                | Self::Expired
        )
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AssertMessage => "assertion failure",
            Self::ActionValidate => "action validation failure",
            Self::MissingAuth => "missing authority",
            Self::UnsatisfiedAuthorization => "unsatisfied authorization",
            Self::Expired => "expired transaction",
            Self::Duplicate => "duplicate transaction",
            Self::CpuUsageExceeded => "cpu usage exceeded",
            Self::NetUsageExceeded => "net usage exceeded",
            Self::RamUsageExceeded => "ram usage exceeded",
            Self::Deadline => "deadline exceeded",
            Self::AccountQuery => "account query failure",
            Self::UnknownBlock => "unknown block",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// Failure of a single call against a single endpoint.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Connection refused, reset, transport timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status with no recognizable error body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not JSON or lacked required fields.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The node rejected the request.
    #[error("remote error ({kind}): {message}")]
    Remote {
        kind: RemoteErrorKind,
        code: Option<i64>,
        message: String,
    },
}

impl RpcError {
    /// Build a [`RpcError::Remote`] from a node error body.
    pub fn from_error_body(body: &Value) -> Self {
        let error = body.get("error");
        let name = error
            .and_then(|e| e.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64);

        let detail = error
            .and_then(|e| e.get("details"))
            .and_then(Value::as_array)
            .and_then(|d| d.first())
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str);
        let message = detail
            .or_else(|| error.and_then(|e| e.get("what")).and_then(Value::as_str))
            .or_else(|| body.get("message").and_then(Value::as_str))
            .unwrap_or(name)
            .to_string();

        Self::Remote {
            kind: RemoteErrorKind::from_name(name),
            code,
            message,
        }
    }

    /// Endpoint could not be used at all (the `EndpointUnreachable` category).
    pub fn is_unreachable(&self) -> bool {
        !matches!(self, Self::Remote { .. })
    }

    /// Rejection of the transaction itself rather than of the endpoint.
    pub fn is_fatal_rejection(&self) -> bool {
        matches!(self, Self::Remote { kind, .. } if kind.is_validation())
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Remote { .. } => "remote",
        }
    }
}
