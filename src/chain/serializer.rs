//! Binary transaction serialization.
//!
//! # Wire Layout
//! ```text
//! expiration            u32 LE (unix seconds)
//! ref_block_num         u16 LE
//! ref_block_prefix      u32 LE
//! max_net_usage_words   varuint32
//! max_cpu_usage_ms      u8
//! delay_sec             varuint32
//! context_free_actions  varuint32 count (always 0)
//! actions               varuint32 count, then each action
//! transaction_extensions varuint32 count (always 0)
//! ```

use thiserror::Error;

use crate::chain::types::{Action, ActionData, TransactionRecord};

#[derive(Debug, Error)]
pub enum SerializeError {
    /// Action arguments were never ABI encoded.
    #[error("action {account}::{name} still holds unencoded JSON data")]
    UnencodedAction { account: String, name: String },

    #[error("{what} length {len} does not fit in a varuint32")]
    TooLong { what: &'static str, len: usize },
}

/// Turns a transaction record into the chain's canonical byte form.
///
/// Output must be byte-exact: the signature covers these bytes.
pub trait TransactionSerializer: Send + Sync {
    fn serialize(&self, record: &TransactionRecord) -> Result<Vec<u8>, SerializeError>;
}

/// Serializer for the Antelope/EOSIO transaction format.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbiSerializer;

impl TransactionSerializer for AbiSerializer {
    fn serialize(&self, record: &TransactionRecord) -> Result<Vec<u8>, SerializeError> {
        let mut buf = Vec::with_capacity(64 + record.actions.len() * 64);

        buf.extend_from_slice(&record.expiration.to_le_bytes());
        buf.extend_from_slice(&record.ref_block_num.to_le_bytes());
        buf.extend_from_slice(&record.ref_block_prefix.to_le_bytes());
        write_varuint32(&mut buf, 0); // max_net_usage_words
        buf.push(0); // max_cpu_usage_ms
        write_varuint32(&mut buf, 0); // delay_sec
        write_varuint32(&mut buf, 0); // context_free_actions

        write_len(&mut buf, "actions", record.actions.len())?;
        for action in &record.actions {
            write_action(&mut buf, action)?;
        }

        write_varuint32(&mut buf, 0); // transaction_extensions
        Ok(buf)
    }
}

fn write_action(buf: &mut Vec<u8>, action: &Action) -> Result<(), SerializeError> {
    let data = match &action.data {
        ActionData::Raw(bytes) => bytes,
        ActionData::Structured(_) => {
            return Err(SerializeError::UnencodedAction {
                account: action.account.to_string(),
                name: action.name.to_string(),
            })
        }
    };

    buf.extend_from_slice(&action.account.as_u64().to_le_bytes());
    buf.extend_from_slice(&action.name.as_u64().to_le_bytes());

    write_len(buf, "authorization", action.authorization.len())?;
    for level in &action.authorization {
        buf.extend_from_slice(&level.actor.as_u64().to_le_bytes());
        buf.extend_from_slice(&level.permission.as_u64().to_le_bytes());
    }

    write_len(buf, "action data", data.len())?;
    buf.extend_from_slice(data);
    Ok(())
}

fn write_len(buf: &mut Vec<u8>, what: &'static str, len: usize) -> Result<(), SerializeError> {
    let len32 = u32::try_from(len).map_err(|_| SerializeError::TooLong { what, len })?;
    write_varuint32(buf, len32);
    Ok(())
}

/// LEB128 encoding of an unsigned 32-bit integer.
pub fn write_varuint32(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}
