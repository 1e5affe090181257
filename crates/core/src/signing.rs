//! HMAC-SHA256 request signing for the partner marketplace API.
//!
//! The signed base string is `partner_id + path + timestamp` with no
//! separators. Field order is part of the upstream contract.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authentication material attached to one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    pub partner_id: String,
    pub timestamp: i64,
    pub sign: String,
}

pub fn canonical_string(partner_id: &str, path: &str, timestamp: i64) -> String {
    format!("{partner_id}{path}{timestamp}")
}

/// Lowercase hex HMAC-SHA256 of the canonical string keyed by `secret_key`.
pub fn sign(partner_id: &str, path: &str, timestamp: i64, secret_key: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take any size");
    mac.update(canonical_string(partner_id, path, timestamp).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[derive(Clone)]
pub struct PartnerSigner {
    partner_id: String,
    secret_key: String,
}

impl PartnerSigner {
    pub fn new(partner_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn sign(&self, path: &str, timestamp: i64) -> SignedParams {
        SignedParams {
            partner_id: self.partner_id.clone(),
            timestamp,
            sign: sign(&self.partner_id, path, timestamp, &self.secret_key),
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for PartnerSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerSigner")
            .field("partner_id", &self.partner_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
