//! Endpoint access.
//!
//! # Data Flow
//! ```text
//! ChainRpc trait (client.rs)
//!     ← HttpEndpoint: POST {base}/v1/chain/{get_info,get_block,abi_json_to_bin,push_transaction}
//!     → wire bodies (types.rs)
//!     → per-call failures classified into RpcError (error.rs)
//! ```

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ChainRpc, HttpEndpoint};
pub use error::{RemoteErrorKind, RpcError};
pub use types::ChainInfo;
