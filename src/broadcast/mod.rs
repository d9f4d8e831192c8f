//! Transaction broadcasting with endpoint failover.
//!
//! # Data Flow
//! ```text
//! Broadcaster::transact (handler.rs)
//!     → resolver.rs   sequential failover: head block, chain id, ABI encodings
//!     → assembler.rs  serialize, digest, sign, hex-encode
//!     → race.rs       parallel push to every endpoint, first confirmation wins
//! ```
//!
//! Endpoint order is the configuration order in both the resolver and the race.

pub mod assembler;
pub mod error;
pub mod handler;
pub mod race;
pub mod resolver;

pub use error::{AssembleError, TransactError};
pub use handler::{BroadcastOptions, Broadcaster};
pub use resolver::ResolvedReference;
