use serde::{Deserialize, Serialize};

use crate::primitives::{CredentialId, Principal};

/// One verification outcome logged against a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEvent {
    pub verifier: Principal,
    pub timestamp: u64,
    pub result: bool,
}

/// One attempt to view or share a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub credential_id: CredentialId,
    pub accessor: Principal,
    pub timestamp: u64,
    pub success: bool,
}
