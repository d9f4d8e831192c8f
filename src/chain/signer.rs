//! Key loading and digest signing.
//!
//! # Security
//! - Private keys are read from explicit strings or environment variables only
//! - Keys are never logged or serialized

use alloy::signers::local::PrivateKeySigner;
use ecdsa::hazmat::SignPrimitive;
use k256::{FieldBytes, Scalar};
use ripemd::{Digest as _, Ripemd160};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

use crate::chain::types::Signature;

/// Default environment variable holding the signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "WAX_PRIVATE_KEY";

const WIF_VERSION: u8 = 0x80;
const K1_SUFFIX: &[u8] = b"K1";

/// Nonce attempts before giving up. At least one nonce in four yields a canonical low-s signature.
const MAX_NONCE_ATTEMPTS: u32 = 256;

/// secp256k1 group order divided by two.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("environment variable {0} not set")]
    MissingEnv(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Produces one signature over a transaction digest.
pub trait TransactionSigner: Send + Sync {
    fn sign(&self, digest: &[u8; 32]) -> Result<Signature, SignError>;
}

/// secp256k1 signer emitting `SIG_K1_` signatures.
#[derive(Clone)]
pub struct K1Signer {
    inner: PrivateKeySigner,
}

impl K1Signer {
    /// Parse a private key in legacy WIF (`5...`), `PVT_K1_...` or raw hex form.
    pub fn from_key_str(key: &str) -> Result<Self, SignError> {
        let key = key.trim();
        let secret = if let Some(body) = key.strip_prefix("PVT_K1_") {
            decode_k1_checked(body)?
        } else if let Ok(secret) = decode_wif(key) {
            secret
        } else {
            let hex_key = key.strip_prefix("0x").unwrap_or(key);
            hex::decode(hex_key)
                .map_err(|_| SignError::InvalidKey("unrecognized key format".to_string()))?
        };

        let inner = PrivateKeySigner::from_slice(&secret)
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;

        let signer = Self { inner };
        tracing::debug!(public_key = %signer.public_key(), "Signer initialized");
        Ok(signer)
    }

    /// Load the key from the given environment variable.
    pub fn from_env(var: &str) -> Result<Self, SignError> {
        let key = std::env::var(var).map_err(|_| SignError::MissingEnv(var.to_string()))?;
        Self::from_key_str(&key)
    }

    /// Public key in `PUB_K1_` form.
    pub fn public_key(&self) -> String {
        let point = self.inner.credential().verifying_key().to_encoded_point(true);
        format!("PUB_K1_{}", encode_k1_checked(point.as_bytes()))
    }
}

impl TransactionSigner for K1Signer {
    /// RFC6979 signing, retried with a counter as extra data until `r` and `s`
    /// pass the legacy canonical check that older nodes still enforce.
    fn sign(&self, digest: &[u8; 32]) -> Result<Signature, SignError> {
        let secret: &Scalar = self.inner.credential().as_nonzero_scalar().as_ref();
        let z = FieldBytes::from(*digest);

        for attempt in 0..MAX_NONCE_ATTEMPTS {
            let counter = attempt.to_be_bytes();
            let extra: &[u8] = if attempt == 0 { &[] } else { &counter };

            let (sig, recovery_id) = secret
                .try_sign_prehashed_rfc6979::<Sha256>(&z, extra)
                .map_err(|e| SignError::Signing(e.to_string()))?;
            let recovery_id =
                recovery_id.ok_or_else(|| SignError::Signing("missing recovery id".to_string()))?;

            let (r, s) = sig.split_bytes();
            if !is_canonical(&r, &s) || s.as_slice() > HALF_ORDER.as_slice() {
                continue;
            }

            let mut compact = Vec::with_capacity(65);
            compact.push(27 + 4 + recovery_id.to_byte());
            compact.extend_from_slice(&r);
            compact.extend_from_slice(&s);

            if attempt > 0 {
                tracing::trace!(attempt, "Canonical signature found after retry");
            }
            return Ok(Signature::new(format!("SIG_K1_{}", encode_k1_checked(&compact))));
        }

        Err(SignError::Signing(format!(
            "no canonical signature after {MAX_NONCE_ATTEMPTS} nonces"
        )))
    }
}

/// Legacy `is_canonical`: neither `r` nor `s` may have the high bit set or an
/// unnecessary leading zero byte.
pub fn is_canonical(r: &[u8], s: &[u8]) -> bool {
    let ok = |v: &[u8]| v[0] & 0x80 == 0 && !(v[0] == 0 && v[1] & 0x80 == 0);
    ok(r) && ok(s)
}

impl fmt::Debug for K1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("K1Signer")
            .field("public_key", &self.public_key())
            .finish()
    }
}

fn k1_checksum(data: &[u8]) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(K1_SUFFIX);
    let hash = hasher.finalize();
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_k1_checked(data: &[u8]) -> String {
    let mut buf = data.to_vec();
    buf.extend_from_slice(&k1_checksum(data));
    bs58::encode(buf).into_string()
}

fn decode_k1_checked(body: &str) -> Result<Vec<u8>, SignError> {
    let raw = bs58::decode(body)
        .into_vec()
        .map_err(|e| SignError::InvalidKey(e.to_string()))?;
    if raw.len() != 36 {
        return Err(SignError::InvalidKey("PVT_K1 key has wrong length".to_string()));
    }

    let (secret, checksum) = raw.split_at(32);
    if k1_checksum(secret) != checksum {
        return Err(SignError::InvalidKey("PVT_K1 checksum mismatch".to_string()));
    }
    Ok(secret.to_vec())
}

fn decode_wif(wif: &str) -> Result<Vec<u8>, SignError> {
    let raw = bs58::decode(wif)
        .into_vec()
        .map_err(|e| SignError::InvalidKey(e.to_string()))?;
    if raw.len() != 37 || raw[0] != WIF_VERSION {
        return Err(SignError::InvalidKey("not a WIF key".to_string()));
    }

    let (payload, checksum) = raw.split_at(33);
    let hash = Sha256::digest(Sha256::digest(payload));
    if &hash[..4] != checksum {
        return Err(SignError::InvalidKey("WIF checksum mismatch".to_string()));
    }
    Ok(payload[1..].to_vec())
}
