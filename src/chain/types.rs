//! Chain data model: names, actions, reference block data and the
//! transaction record that gets serialized and signed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters allowed in an account/action name, indexed by symbol value.
const NAME_CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum length of a name in characters.
const NAME_MAX_LEN: usize = 13;

/// Errors produced when parsing a [`Name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name '{0}' is longer than 13 characters")]
    TooLong(String),

    #[error("name '{name}' contains invalid character '{ch}'")]
    InvalidChar { name: String, ch: char },

    #[error("13th character of name '{0}' must be in '.12345abcdefghij'")]
    InvalidTrailing(String),
}

/// Account, action or permission name packed into 64 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u64);

impl Name {
    /// Build a name from its raw 64-bit value.
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// The raw 64-bit value used on the wire.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() > NAME_MAX_LEN {
            return Err(NameError::TooLong(s.to_string()));
        }

        let mut value = 0u64;
        for (i, &c) in bytes.iter().enumerate() {
            let symbol = char_to_symbol(c).ok_or_else(|| NameError::InvalidChar {
                name: s.to_string(),
                ch: c as char,
            })?;

            if i < 12 {
                value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
            } else {
                if symbol > 0x0f {
                    return Err(NameError::InvalidTrailing(s.to_string()));
                }
                value |= symbol;
            }
        }

        Ok(Self(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; NAME_MAX_LEN];
        let mut rest = self.0;

        for i in 0..NAME_MAX_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[NAME_MAX_LEN - 1 - i] = NAME_CHARMAP[(rest & mask) as usize];
            rest >>= shift;
        }

        let len = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // NAME_CHARMAP is ASCII
        f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| fmt::Error)?)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An (actor, permission) pair authorizing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

/// Action payload, either as JSON waiting for ABI encoding or as encoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionData {
    Structured(Value),
    Raw(Vec<u8>),
}

impl ActionData {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// A single contract action.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: ActionData,
}

impl Action {
    /// Create an action with JSON arguments that still need ABI encoding.
    pub fn new(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Value,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data: ActionData::Structured(data),
        }
    }

    /// Create an action whose arguments are already encoded.
    pub fn raw(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data: ActionData::Raw(data),
        }
    }
}

/// Reference data taken from the chain's head block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadBlockInfo {
    pub block_num: u32,
    pub ref_block_prefix: u32,
}

impl HeadBlockInfo {
    /// Lower 16 bits of the block number, as carried in a transaction header.
    pub fn ref_block_num(&self) -> u16 {
        (self.block_num & 0xFFFF) as u16
    }
}

/// Identifier of the target network. Only ever used as digest input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId(Vec<u8>);

impl ChainId {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Unsigned transaction, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Expiration as unix seconds.
    pub expiration: u32,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub actions: Vec<Action>,
}

impl TransactionRecord {
    pub fn new(expiration: u32, head: &HeadBlockInfo, actions: Vec<Action>) -> Self {
        Self {
            expiration,
            ref_block_num: head.ref_block_num(),
            ref_block_prefix: head.ref_block_prefix,
            actions,
        }
    }
}

/// Signature in its textual wire form (e.g. `SIG_K1_...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed, packed transaction as pushed to the endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signatures: Vec<Signature>,
    /// Hex-encoded serialized transaction.
    pub packed_trx: String,
}

/// Response of the endpoint that first confirmed the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub endpoint: String,
    pub response: Value,
}

impl Confirmation {
    pub fn transaction_id(&self) -> Option<&str> {
        self.response.get("transaction_id").and_then(Value::as_str)
    }

    pub fn block_num(&self) -> Option<u64> {
        self.response
            .get("processed")
            .and_then(|p| p.get("block_num"))
            .and_then(Value::as_u64)
    }
}
