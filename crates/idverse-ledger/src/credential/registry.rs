//! Credential registry state and operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::events::{EventJournal, EventRecord, LedgerEvent};
use crate::primitives::{ContentHash, CredentialId, Principal, Tx};

use super::record::CredentialRecord;

/// Credential id → record mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialRegistry {
    records: BTreeMap<CredentialId, CredentialRecord>,
    journal: EventJournal,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a credential with the caller as issuer.
    ///
    /// No content validation is done: a zero hash or empty `cid` is
    /// accepted as given.
    ///
    /// # Errors
    ///
    /// `InvalidPrincipal` if the caller is the zero principal.
    /// `AlreadyExists` if `credential_id` is taken, whoever the caller is.
    pub fn issue(
        &mut self,
        tx: &Tx,
        credential_id: CredentialId,
        holder: Principal,
        credential_hash: ContentHash,
        cid: impl Into<String>,
    ) -> Result<()> {
        if tx.caller.is_zero() {
            log::debug!("issue rejected: zero principal cannot issue {credential_id}");
            return Err(LedgerError::InvalidPrincipal);
        }
        if self.records.contains_key(&credential_id) {
            log::debug!("issue rejected: {credential_id} exists");
            return Err(LedgerError::AlreadyExists(credential_id.to_string()));
        }

        let cid = cid.into();
        self.records.insert(
            credential_id,
            CredentialRecord {
                issuer: tx.caller,
                holder,
                credential_hash,
                cid: cid.clone(),
                issued_at: tx.timestamp,
                revoked: false,
            },
        );
        self.journal.emit(
            tx,
            LedgerEvent::CredentialIssued {
                credential_id,
                issuer: tx.caller,
                holder,
                credential_hash,
                cid,
            },
        );
        Ok(())
    }

    /// Permanently revoke a credential.
    ///
    /// # Errors
    ///
    /// `NotIssuer` if the caller is not the stored issuer (including when
    /// the credential does not exist or the caller is the zero principal),
    /// `AlreadyRevoked` if it is revoked.
    pub fn revoke(&mut self, tx: &Tx, credential_id: CredentialId) -> Result<()> {
        let record = match self.records.get_mut(&credential_id) {
            Some(record) if !record.issuer.is_zero() && record.issuer == tx.caller => record,
            _ => {
                log::debug!("revoke rejected: {} is not issuer of {credential_id}", tx.caller);
                return Err(LedgerError::NotIssuer(credential_id.to_string()));
            }
        };
        if record.revoked {
            log::debug!("revoke rejected: {credential_id} already revoked");
            return Err(LedgerError::AlreadyRevoked(credential_id.to_string()));
        }

        record.revoked = true;
        let issuer = record.issuer;
        self.journal.emit(
            tx,
            LedgerEvent::CredentialRevoked {
                credential_id,
                issuer,
            },
        );
        Ok(())
    }

    /// Read a credential. Unknown ids yield the zero record.
    pub fn get(&self, credential_id: &CredentialId) -> CredentialRecord {
        self.records
            .get(credential_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Ids of every credential issued by `issuer`, in id order.
    pub fn issued_by(&self, issuer: &Principal) -> Vec<CredentialId> {
        self.records
            .iter()
            .filter(|(_, r)| r.issuer == *issuer)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids of every credential held by `holder`, in id order.
    pub fn held_by(&self, holder: &Principal) -> Vec<CredentialId> {
        self.records
            .iter()
            .filter(|(_, r)| r.holder == *holder)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Check that every stored issuer is non-zero.
    pub(crate) fn check_integrity(&self) -> std::result::Result<(), String> {
        if let Some((id, _)) = self.records.iter().find(|(_, r)| r.issuer.is_zero()) {
            return Err(format!("credential {id} has the zero issuer"));
        }
        self.journal.check_sequences()
    }
}
