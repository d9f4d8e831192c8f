//! Fault-tolerant transaction broadcaster for WAX / Antelope chains.
//!
//! Reference data is read from the first healthy endpoint in order, the
//! transaction is signed locally, then pushed to every endpoint at once and
//! the first confirmed inclusion wins.

pub mod broadcast;
pub mod chain;
pub mod config;
pub mod observability;
pub mod rpc;

pub use broadcast::{BroadcastOptions, Broadcaster, TransactError};
pub use chain::{Action, K1Signer, Name, PermissionLevel};
pub use config::BroadcasterConfig;
pub use rpc::{ChainRpc, HttpEndpoint};
