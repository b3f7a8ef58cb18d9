//! Audit log state and operations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::events::{EventJournal, EventRecord, LedgerEvent};
use crate::primitives::{CredentialId, Principal, Tx};

use super::types::{AccessLogEntry, VerificationEvent};

/// Verifier allowlist plus the verification and access logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    owner: Principal,
    verifiers: BTreeSet<Principal>,
    verifications: BTreeMap<CredentialId, Vec<VerificationEvent>>,
    access_log: Vec<AccessLogEntry>,
    journal: EventJournal,
}

impl AuditLog {
    /// Create an audit log owned by the deploying caller.
    ///
    /// The owner is authorized as a verifier from the start.
    ///
    /// # Errors
    ///
    /// `InvalidPrincipal` if the caller is the zero principal.
    pub fn deploy(tx: &Tx) -> Result<Self> {
        if tx.caller.is_zero() {
            return Err(LedgerError::InvalidPrincipal);
        }
        let mut audit = Self {
            owner: tx.caller,
            verifiers: BTreeSet::from([tx.caller]),
            verifications: BTreeMap::new(),
            access_log: Vec::new(),
            journal: EventJournal::new(),
        };
        audit.journal.emit(
            tx,
            LedgerEvent::VerifierAuthorized {
                verifier: tx.caller,
            },
        );
        Ok(audit)
    }

    // ── Allowlist management ──────────────────────────────────────────────────

    /// Authorize `verifier` to log verification results.
    ///
    /// # Errors
    ///
    /// `NotOwner`, `InvalidPrincipal` for the zero principal, or
    /// `AlreadyAuthorized`.
    pub fn add_verifier(&mut self, tx: &Tx, verifier: Principal) -> Result<()> {
        self.only_owner(tx)?;
        if verifier.is_zero() {
            return Err(LedgerError::InvalidPrincipal);
        }
        if self.verifiers.contains(&verifier) {
            return Err(LedgerError::AlreadyAuthorized(verifier.to_string()));
        }

        self.verifiers.insert(verifier);
        self.journal
            .emit(tx, LedgerEvent::VerifierAuthorized { verifier });
        Ok(())
    }

    /// Withdraw `verifier`'s authorization.
    ///
    /// # Errors
    ///
    /// `NotOwner`, `NotAuthorized` if absent, or `CannotRemoveOwner`.
    pub fn remove_verifier(&mut self, tx: &Tx, verifier: Principal) -> Result<()> {
        self.only_owner(tx)?;
        if !self.verifiers.contains(&verifier) {
            return Err(LedgerError::NotAuthorized(verifier.to_string()));
        }
        if verifier == self.owner {
            return Err(LedgerError::CannotRemoveOwner);
        }

        self.verifiers.remove(&verifier);
        self.journal
            .emit(tx, LedgerEvent::VerifierDeauthorized { verifier });
        Ok(())
    }

    /// Hand ownership to `new_owner`, who becomes an authorized verifier.
    ///
    /// The previous owner stays on the allowlist; the new owner has to
    /// remove it explicitly.
    ///
    /// # Errors
    ///
    /// `NotOwner`, `InvalidPrincipal` for the zero principal, or
    /// `AlreadySelf` when transferring to the current owner.
    pub fn transfer_ownership(&mut self, tx: &Tx, new_owner: Principal) -> Result<()> {
        self.only_owner(tx)?;
        if new_owner.is_zero() {
            return Err(LedgerError::InvalidPrincipal);
        }
        if new_owner == self.owner {
            return Err(LedgerError::AlreadySelf);
        }

        let previous_owner = self.owner;
        self.owner = new_owner;
        self.journal.emit(
            tx,
            LedgerEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
        if self.verifiers.insert(new_owner) {
            self.journal.emit(
                tx,
                LedgerEvent::VerifierAuthorized {
                    verifier: new_owner,
                },
            );
        }
        Ok(())
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn is_authorized_verifier(&self, principal: &Principal) -> bool {
        self.verifiers.contains(principal)
    }

    /// Every authorized verifier, in address order.
    pub fn verifiers(&self) -> Vec<Principal> {
        self.verifiers.iter().copied().collect()
    }

    // ── Verification logging ──────────────────────────────────────────────────

    /// Record a verification outcome for `credential_id`.
    ///
    /// # Errors
    ///
    /// `NotAuthorizedVerifier` unless the caller is on the allowlist.
    pub fn log_verification(
        &mut self,
        tx: &Tx,
        credential_id: CredentialId,
        result: bool,
    ) -> Result<()> {
        if !self.verifiers.contains(&tx.caller) {
            log::debug!("log_verification rejected: {} not a verifier", tx.caller);
            return Err(LedgerError::NotAuthorizedVerifier(tx.caller.to_string()));
        }

        self.verifications
            .entry(credential_id)
            .or_default()
            .push(VerificationEvent {
                verifier: tx.caller,
                timestamp: tx.timestamp,
                result,
            });
        self.journal.emit(
            tx,
            LedgerEvent::CredentialVerified {
                credential_id,
                verifier: tx.caller,
                timestamp: tx.timestamp,
                result,
            },
        );
        Ok(())
    }

    /// Number of verifications logged for `credential_id` (0 if none).
    pub fn verification_count(&self, credential_id: &CredentialId) -> u64 {
        self.verification_history(credential_id).len() as u64
    }

    /// Verification history for `credential_id` in commit order.
    pub fn verification_history(&self, credential_id: &CredentialId) -> &[VerificationEvent] {
        self.verifications
            .get(credential_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Access logging ────────────────────────────────────────────────────────

    /// Record an attempt to view or share `credential_id`. Open to anyone.
    pub fn log_access(&mut self, tx: &Tx, credential_id: CredentialId, success: bool) {
        self.access_log.push(AccessLogEntry {
            credential_id,
            accessor: tx.caller,
            timestamp: tx.timestamp,
            success,
        });
        self.journal.emit(
            tx,
            LedgerEvent::AccessAttempt {
                credential_id,
                accessor: tx.caller,
                timestamp: tx.timestamp,
                success,
            },
        );
    }

    pub fn access_log_count(&self) -> u64 {
        self.access_log.len() as u64
    }

    /// Access log entry at absolute position `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` if `index >= access_log_count()`.
    pub fn access_log_entry(&self, index: u64) -> Result<AccessLogEntry> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.access_log.get(i))
            .copied()
            .ok_or(LedgerError::IndexOutOfBounds {
                index,
                len: self.access_log_count(),
            })
    }

    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Check the ownership rules a loaded log must still satisfy: a
    /// non-zero owner that is on the allowlist, and no zero verifier.
    pub(crate) fn check_integrity(&self) -> std::result::Result<(), String> {
        if self.owner.is_zero() {
            return Err("audit log owner is the zero principal".into());
        }
        if !self.verifiers.contains(&self.owner) {
            return Err(format!("audit log owner {} is not a verifier", self.owner));
        }
        if self.verifiers.contains(&Principal::ZERO) {
            return Err("zero principal is an authorized verifier".into());
        }
        self.journal.check_sequences()
    }

    fn only_owner(&self, tx: &Tx) -> Result<()> {
        if tx.caller != self.owner {
            log::debug!("rejected: {} is not the audit log owner", tx.caller);
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }
}
