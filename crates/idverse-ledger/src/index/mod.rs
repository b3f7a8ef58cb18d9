//! Timeline index over the ledger's event journals.
//!
//! [`TimelineIndex`] merges the identity, credential, and audit journals
//! into one time-ordered sequence and keeps secondary indexes so that
//! "who did what when" can be answered per credential, per identifier, or
//! per principal without scanning.
//!
//! The index holds owned copies of the records; rebuild it after applying
//! new commands.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::EventRecord;
use crate::ledger::{Component, Ledger};
use crate::primitives::{CredentialId, Identifier, Principal};

/// One event together with the component that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub component: Component,
    pub record: EventRecord,
}

/// Time-ordered, multiply-indexed view of all ledger events.
pub struct TimelineIndex {
    /// Primary store, ordered by (timestamp, component, sequence).
    entries: Vec<TimelineEntry>,
    /// Secondary index: credential id → positions in `entries`.
    by_credential: HashMap<CredentialId, Vec<usize>>,
    /// Secondary index: identifier → positions in `entries`.
    by_identifier: HashMap<Identifier, Vec<usize>>,
    /// Secondary index: caller or named principal → positions in `entries`.
    by_principal: HashMap<Principal, Vec<usize>>,
}

impl TimelineIndex {
    /// Build the index from the current state of `ledger`.
    pub fn build(ledger: &Ledger) -> Self {
        let mut entries: Vec<TimelineEntry> = [
            Component::Identity,
            Component::Credential,
            Component::Audit,
        ]
        .into_iter()
        .flat_map(|component| {
            ledger
                .events(component)
                .iter()
                .cloned()
                .map(move |record| TimelineEntry { component, record })
        })
        .collect();

        entries.sort_by_key(|e| (e.record.timestamp, e.component, e.record.sequence));

        let mut index = Self {
            entries: Vec::with_capacity(entries.len()),
            by_credential: HashMap::new(),
            by_identifier: HashMap::new(),
            by_principal: HashMap::new(),
        };
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    fn insert(&mut self, entry: TimelineEntry) {
        let pos = self.entries.len();
        let event = &entry.record.event;

        if let Some(id) = event.credential_id() {
            self.by_credential.entry(id).or_default().push(pos);
        }
        if let Some(did) = event.identifier() {
            self.by_identifier.entry(did).or_default().push(pos);
        }

        let mut principals = event.principals();
        principals.push(entry.record.caller);
        principals.sort();
        principals.dedup();
        for principal in principals {
            self.by_principal.entry(principal).or_default().push(pos);
        }

        self.entries.push(entry);
    }

    /// Every event in timeline order.
    pub fn all(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Events concerning `credential_id`: issuance, revocation,
    /// verifications, and access attempts.
    pub fn for_credential(&self, credential_id: &CredentialId) -> Vec<&TimelineEntry> {
        self.collect(self.by_credential.get(credential_id))
    }

    /// Events concerning an identity record.
    pub fn for_identifier(&self, did: &Identifier) -> Vec<&TimelineEntry> {
        self.collect(self.by_identifier.get(did))
    }

    /// Events a principal submitted or is named in.
    pub fn for_principal(&self, principal: &Principal) -> Vec<&TimelineEntry> {
        self.collect(self.by_principal.get(principal))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect(&self, positions: Option<&Vec<usize>>) -> Vec<&TimelineEntry> {
        positions
            .map(|ps| ps.iter().filter_map(|&p| self.entries.get(p)).collect())
            .unwrap_or_default()
    }
}
