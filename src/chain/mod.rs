//! Chain data model and the serialization/signing collaborators.
//!
//! # Data Flow
//! ```text
//! Action (JSON data)
//!     → ABI encoded by an endpoint (rpc module)
//!     → TransactionRecord (types.rs)
//!     → serializer.rs (canonical bytes)
//!     → signer.rs (SIG_K1_ signature over the digest)
//! ```

pub mod serializer;
pub mod signer;
pub mod types;

pub use serializer::{AbiSerializer, SerializeError, TransactionSerializer};
pub use signer::{K1Signer, SignError, TransactionSigner};
pub use types::{
    Action, ActionData, ChainId, Confirmation, HeadBlockInfo, Name, NameError, PermissionLevel,
    Signature, SignedTransaction, TransactionRecord,
};
