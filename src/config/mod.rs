//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BroadcasterConfig (validated, immutable)
//!     → Broadcaster::from_config
//! ```
//!
//! Every field has a default so a minimal file can name just a network
//! preset. The private key is never read from the file, only the name of the
//! environment variable holding it.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with_endpoints, parse_config, read_config, ConfigError};
pub use schema::{BroadcasterConfig, LogFormat, Network};
pub use validation::ValidationError;
