//! Audit log: verifier allowlist, verification history, and access log.
//!
//! Two sub-protocols share one allowlist:
//! - Verification logging is restricted to allow-listed principals and is
//!   kept per credential.
//! - Access logging is open to anyone and kept in one global sequence.
//!
//! The allowlist is managed by a single owner at a time.

pub mod trail;
pub mod types;

pub use trail::AuditLog;
pub use types::{AccessLogEntry, VerificationEvent};
