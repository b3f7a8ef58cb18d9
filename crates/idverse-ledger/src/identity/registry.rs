//! Identity registry state and operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::events::{EventJournal, EventRecord, LedgerEvent};
use crate::primitives::{Identifier, Principal, Tx};

use super::record::IdentifierRecord;

/// Identifier → controller / document pointer mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityRegistry {
    records: BTreeMap<Identifier, IdentifierRecord>,
    journal: EventJournal,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `did` with an initial controller and document pointer.
    ///
    /// Any caller may register on behalf of any controller; binding the
    /// caller to the controller is the signing layer's concern.
    ///
    /// # Errors
    ///
    /// `AlreadyRegistered` if `did` has a record, `InvalidPrincipal` if
    /// `controller` is zero.
    pub fn register(
        &mut self,
        tx: &Tx,
        did: Identifier,
        controller: Principal,
        document_pointer: impl Into<String>,
    ) -> Result<()> {
        if self.records.contains_key(&did) {
            log::debug!("register rejected: {did} already registered");
            return Err(LedgerError::AlreadyRegistered(did.to_string()));
        }
        if controller.is_zero() {
            log::debug!("register rejected: zero controller for {did}");
            return Err(LedgerError::InvalidPrincipal);
        }

        let document_pointer = document_pointer.into();
        self.records.insert(
            did,
            IdentifierRecord {
                controller,
                document_pointer: document_pointer.clone(),
            },
        );
        self.journal.emit(
            tx,
            LedgerEvent::DidRegistered {
                did,
                controller,
                doc_pointer: document_pointer,
            },
        );
        Ok(())
    }

    /// Hand control of `did` to `new_controller`.
    ///
    /// # Errors
    ///
    /// `NotController` unless the caller is the current controller (always
    /// for unregistered identifiers), `InvalidPrincipal` if
    /// `new_controller` is zero.
    pub fn update_controller(
        &mut self,
        tx: &Tx,
        did: Identifier,
        new_controller: Principal,
    ) -> Result<()> {
        let old_controller = self.authorize_controller(tx, &did)?;
        if new_controller.is_zero() {
            log::debug!("update_controller rejected: zero controller for {did}");
            return Err(LedgerError::InvalidPrincipal);
        }

        if let Some(record) = self.records.get_mut(&did) {
            record.controller = new_controller;
        }
        self.journal.emit(
            tx,
            LedgerEvent::ControllerChanged {
                did,
                old_controller,
                new_controller,
            },
        );
        Ok(())
    }

    /// Replace the document pointer of `did`. An empty pointer is allowed.
    ///
    /// # Errors
    ///
    /// `NotController` unless the caller is the current controller.
    pub fn update_document_pointer(
        &mut self,
        tx: &Tx,
        did: Identifier,
        pointer: impl Into<String>,
    ) -> Result<()> {
        self.authorize_controller(tx, &did)?;

        let pointer = pointer.into();
        if let Some(record) = self.records.get_mut(&did) {
            record.document_pointer = pointer.clone();
        }
        self.journal.emit(
            tx,
            LedgerEvent::DocPointerUpdated {
                did,
                doc_pointer: pointer,
            },
        );
        Ok(())
    }

    /// Current controller, or the zero principal for unknown identifiers.
    pub fn controller(&self, did: &Identifier) -> Principal {
        self.records
            .get(did)
            .map(|r| r.controller)
            .unwrap_or(Principal::ZERO)
    }

    /// Current document pointer, or `""` for unknown identifiers.
    pub fn document_pointer(&self, did: &Identifier) -> &str {
        self.records
            .get(did)
            .map(|r| r.document_pointer.as_str())
            .unwrap_or("")
    }

    pub fn get(&self, did: &Identifier) -> Option<&IdentifierRecord> {
        self.records.get(did)
    }

    pub fn is_registered(&self, did: &Identifier) -> bool {
        self.records.contains_key(did)
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Check that every stored controller is non-zero.
    pub(crate) fn check_integrity(&self) -> std::result::Result<(), String> {
        if let Some((did, _)) = self.records.iter().find(|(_, r)| r.controller.is_zero()) {
            return Err(format!("identifier {did} has the zero controller"));
        }
        self.journal.check_sequences()
    }

    /// Return the stored controller if it equals the caller.
    fn authorize_controller(&self, tx: &Tx, did: &Identifier) -> Result<Principal> {
        match self.records.get(did) {
            Some(record) if record.controller == tx.caller => Ok(record.controller),
            _ => {
                log::debug!("rejected: {} is not controller of {did}", tx.caller);
                Err(LedgerError::NotController(did.to_string()))
            }
        }
    }
}
