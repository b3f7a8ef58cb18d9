//! Credential registry: issuance and one-way revocation of attestations.
//!
//! Issuance fields are immutable once written and `revoked` only ever moves
//! from false to true, so a single read answers whether a credential was
//! issued, by whom, and whether it is still trusted.

pub mod record;
pub mod registry;

pub use record::{CredentialRecord, CredentialStatus};
pub use registry::CredentialRegistry;
