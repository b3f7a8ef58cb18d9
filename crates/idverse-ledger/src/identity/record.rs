use serde::{Deserialize, Serialize};

use crate::primitives::Principal;

/// Latest state of a registered identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRecord {
    /// Principal holding mutation rights. Never zero.
    pub controller: Principal,
    /// Pointer to an off-ledger DID document. May be empty.
    pub document_pointer: String,
}
