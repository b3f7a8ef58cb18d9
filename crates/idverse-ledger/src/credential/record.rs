use serde::{Deserialize, Serialize};

use crate::primitives::{ContentHash, Principal};

/// A credential as stored on the ledger.
///
/// The payload itself lives off-ledger; the record holds its hash and a
/// pointer. The `Default` value is the zero record returned for unknown ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub issuer: Principal,
    pub holder: Principal,
    pub credential_hash: ContentHash,
    pub cid: String,
    /// Ledger time of issuance, Unix seconds.
    pub issued_at: u64,
    pub revoked: bool,
}

impl CredentialRecord {
    /// Whether this is a real record. A zero issuer means "never issued".
    pub fn exists(&self) -> bool {
        !self.issuer.is_zero()
    }

    pub fn status(&self) -> CredentialStatus {
        if !self.exists() {
            CredentialStatus::Unknown
        } else if self.revoked {
            CredentialStatus::Revoked
        } else {
            CredentialStatus::Active
        }
    }
}

/// Trust status of a credential as seen by a verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Never issued.
    Unknown,
    Active,
    Revoked,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
