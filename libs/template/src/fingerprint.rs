//! Deterministic template fingerprints.
//!
//! Two compositions of the same input produce byte-identical JSON,
//! so comparing fingerprints tells whether a re-apply would change the stack.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A template fingerprint for deterministic comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TemplateFingerprint(String);

impl TemplateFingerprint {
    /// Hash the compact JSON form. Object keys serialize in sorted order, so
    /// the fingerprint does not depend on insertion order.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let digest = Sha256::digest(json.to_string().as_bytes());
        Self(format!("sha256:{}", hex::encode(&digest[..16])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
