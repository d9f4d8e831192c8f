//! Configuration validation.
//!
//! Semantic checks only (serde handles syntax). Returns every error found,
//! not just the first.

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::chain::types::Name;
use crate::config::schema::BroadcasterConfig;

/// Longest transaction lifetime a node accepts by default.
const MAX_EXPIRATION_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no endpoints configured (set `endpoints` or `network`)")]
    NoEndpoints,

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("endpoint '{0}' listed more than once")]
    DuplicateEndpoint(String),

    #[error("invalid account.{field} '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("account.private_key_env must not be empty")]
    EmptyKeyEnv,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("broadcast.expiration_secs must be between 1 and {MAX_EXPIRATION_SECS}, got {0}")]
    InvalidExpiration(u64),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BroadcasterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoints = config.resolved_endpoints();
    if endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut seen = HashSet::new();
    for endpoint in &endpoints {
        match Url::parse(endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::InvalidEndpoint {
                url: endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                url: endpoint.clone(),
                reason: e.to_string(),
            }),
        }

        if !seen.insert(endpoint.trim_end_matches('/')) {
            errors.push(ValidationError::DuplicateEndpoint(endpoint.clone()));
        }
    }

    // An empty account name is allowed for read-only use (probing).
    if !config.account.name.is_empty() {
        check_name(&mut errors, "name", &config.account.name);
    }
    check_name(&mut errors, "permission", &config.account.permission);

    if config.account.private_key_env.is_empty() {
        errors.push(ValidationError::EmptyKeyEnv);
    }

    if config.broadcast.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("broadcast.timeout_secs"));
    }
    if config.rpc.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("rpc.request_timeout_secs"));
    }

    let expiration = config.broadcast.expiration_secs;
    if expiration == 0 || expiration > MAX_EXPIRATION_SECS {
        errors.push(ValidationError::InvalidExpiration(expiration));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_name(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.is_empty() {
        errors.push(ValidationError::InvalidName {
            field,
            value: String::new(),
            reason: "must not be empty".to_string(),
        });
        return;
    }
    if let Err(e) = value.parse::<Name>() {
        errors.push(ValidationError::InvalidName {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        });
    }
}
