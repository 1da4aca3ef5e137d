//! Parameter fingerprinting: stable identity for a `ParameterSet`.
//!
//! The fingerprint is the blake3 hex digest of the set's JSON form. Field order
//! is fixed by the struct declaration, so equal sets always hash equally and
//! the digest doubles as a cache key and artifact directory suffix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ParameterSet;

/// Hex digest identifying one parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamsFingerprint(pub String);

impl ParamsFingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First eight hex digits, used in directory names and log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for ParamsFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ParameterSet {
    pub fn fingerprint(&self) -> ParamsFingerprint {
        // Flat struct of numbers; serde_json cannot fail on it
        let json = serde_json::to_string(self).expect("ParameterSet must serialize");
        ParamsFingerprint::from_bytes(json.as_bytes())
    }
}
