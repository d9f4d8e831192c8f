//! Request and response bodies of the `/v1/chain` API.
//!
//! Only the fields this crate reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::types::{Name, Signature};

/// `get_info` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainInfo {
    pub head_block_num: u32,
    pub chain_id: String,
    #[serde(default)]
    pub last_irreversible_block_num: Option<u32>,
    #[serde(default)]
    pub head_block_time: Option<String>,
    #[serde(default)]
    pub server_version_string: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBlockRequest {
    pub block_num_or_id: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetBlockResponse {
    pub block_num: u32,
    pub ref_block_prefix: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AbiJsonToBinRequest<'a> {
    pub code: Name,
    pub action: Name,
    pub args: &'a Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AbiJsonToBinResponse {
    pub binargs: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PushTransactionRequest<'a> {
    pub signatures: &'a [Signature],
    pub compression: u8,
    pub packed_context_free_data: &'a str,
    pub packed_trx: &'a str,
}
