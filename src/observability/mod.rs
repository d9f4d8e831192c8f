//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rpc / broadcast
//!     → logging.rs (structured tracing events, one span per transact call)
//!     → metrics.rs (call counters, broadcast outcomes and latency)
//! ```

pub mod logging;
pub mod metrics;
