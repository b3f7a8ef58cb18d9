//! Idverse ledger: decentralized identity and credential state.
//!
//! Three independent components share one host:
//! - the identity registry maps identifiers to a controller and a document
//!   pointer;
//! - the credential registry records issued credentials by content hash and
//!   their revocation status;
//! - the audit log keeps a verifier allowlist, per-credential verification
//!   history, and a global access log.
//!
//! Every mutation is submitted with a [`Tx`] naming the authenticated caller
//! and is atomic: it either succeeds and appends its events, or fails with a
//! [`LedgerError`] and changes nothing.

pub mod audit;
pub mod credential;
pub mod error;
pub mod events;
pub mod identity;
pub mod index;
pub mod ledger;
pub mod primitives;
pub mod storage;
pub mod time;

// Re-export primary types
pub use error::{ErrorKind, LedgerError, Result};
pub use events::{EventJournal, EventRecord, LedgerEvent};
pub use ledger::{Command, Component, Ledger};
pub use primitives::{Bytes32, ContentHash, CredentialId, Identifier, Principal, Tx};

// Re-export component types
pub use audit::{AccessLogEntry, AuditLog, VerificationEvent};
pub use credential::{CredentialRecord, CredentialRegistry, CredentialStatus};
pub use identity::{IdentifierRecord, IdentityRegistry};

pub use index::{TimelineEntry, TimelineIndex};
pub use storage::{LedgerLock, LedgerStore};
