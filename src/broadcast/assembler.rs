//! Transaction assembly: record → bytes → digest → signature → wire form.
//!
//! No I/O happens here; serialization and signing are delegated.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::broadcast::error::AssembleError;
use crate::broadcast::resolver::ResolvedReference;
use crate::chain::serializer::TransactionSerializer;
use crate::chain::signer::TransactionSigner;
use crate::chain::types::{Action, ChainId, SignedTransaction, TransactionRecord};

/// Stand-in for the hash of the (always empty) context-free data.
pub const CONTEXT_FREE_DATA_PLACEHOLDER: [u8; 32] = [0u8; 32];

/// `sha256(chain_id ‖ serialized_tx ‖ 32 zero bytes)`.
pub fn signing_digest(chain_id: &ChainId, serialized_tx: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(chain_id.as_bytes());
    hasher.update(serialized_tx);
    hasher.update(CONTEXT_FREE_DATA_PLACEHOLDER);
    hasher.finalize().into()
}

/// Builds signed transactions from resolved reference data.
#[derive(Clone)]
pub struct TransactionAssembler {
    serializer: Arc<dyn TransactionSerializer>,
    signer: Arc<dyn TransactionSigner>,
}

impl TransactionAssembler {
    pub fn new(
        serializer: Arc<dyn TransactionSerializer>,
        signer: Arc<dyn TransactionSigner>,
    ) -> Self {
        Self { serializer, signer }
    }

    /// Serialize, sign with the single configured key and hex-encode.
    ///
    /// `actions` must already be ABI encoded.
    pub fn assemble(
        &self,
        reference: &ResolvedReference,
        actions: Vec<Action>,
        expiration: u32,
    ) -> Result<SignedTransaction, AssembleError> {
        let record = TransactionRecord::new(expiration, &reference.head_block, actions);
        let serialized = self.serializer.serialize(&record)?;

        let digest = signing_digest(&reference.chain_id, &serialized);
        let signature = self.signer.sign(&digest)?;

        tracing::debug!(
            ref_block_num = record.ref_block_num,
            ref_block_prefix = record.ref_block_prefix,
            bytes = serialized.len(),
            "Transaction assembled"
        );

        Ok(SignedTransaction {
            signatures: vec![signature],
            packed_trx: hex::encode(serialized),
        })
    }
}
