//! Structured events and the append-only journal each component keeps.
//!
//! Every committed mutation appends one or more [`EventRecord`]s carrying
//! its full argument set. Indexers rebuild "who did what when" from these
//! journals instead of polling state.

use serde::{Deserialize, Serialize};

use crate::primitives::{ContentHash, CredentialId, Identifier, Principal, Tx};

/// An event emitted by a committed ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    DidRegistered {
        did: Identifier,
        controller: Principal,
        doc_pointer: String,
    },
    ControllerChanged {
        did: Identifier,
        old_controller: Principal,
        new_controller: Principal,
    },
    DocPointerUpdated {
        did: Identifier,
        doc_pointer: String,
    },
    CredentialIssued {
        credential_id: CredentialId,
        issuer: Principal,
        holder: Principal,
        credential_hash: ContentHash,
        cid: String,
    },
    CredentialRevoked {
        credential_id: CredentialId,
        issuer: Principal,
    },
    VerifierAuthorized {
        verifier: Principal,
    },
    VerifierDeauthorized {
        verifier: Principal,
    },
    OwnershipTransferred {
        previous_owner: Principal,
        new_owner: Principal,
    },
    CredentialVerified {
        credential_id: CredentialId,
        verifier: Principal,
        timestamp: u64,
        result: bool,
    },
    AccessAttempt {
        credential_id: CredentialId,
        accessor: Principal,
        timestamp: u64,
        success: bool,
    },
}

impl LedgerEvent {
    /// Return a stable tag for this event type.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::DidRegistered { .. } => "did_registered",
            Self::ControllerChanged { .. } => "controller_changed",
            Self::DocPointerUpdated { .. } => "doc_pointer_updated",
            Self::CredentialIssued { .. } => "credential_issued",
            Self::CredentialRevoked { .. } => "credential_revoked",
            Self::VerifierAuthorized { .. } => "verifier_authorized",
            Self::VerifierDeauthorized { .. } => "verifier_deauthorized",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::CredentialVerified { .. } => "credential_verified",
            Self::AccessAttempt { .. } => "access_attempt",
        }
    }

    /// The identifier this event concerns, if any.
    pub fn identifier(&self) -> Option<Identifier> {
        match self {
            Self::DidRegistered { did, .. }
            | Self::ControllerChanged { did, .. }
            | Self::DocPointerUpdated { did, .. } => Some(*did),
            _ => None,
        }
    }

    /// The credential this event concerns, if any.
    pub fn credential_id(&self) -> Option<CredentialId> {
        match self {
            Self::CredentialIssued { credential_id, .. }
            | Self::CredentialRevoked { credential_id, .. }
            | Self::CredentialVerified { credential_id, .. }
            | Self::AccessAttempt { credential_id, .. } => Some(*credential_id),
            _ => None,
        }
    }

    /// Every principal named in the event's arguments.
    pub fn principals(&self) -> Vec<Principal> {
        match self {
            Self::DidRegistered { controller, .. } => vec![*controller],
            Self::ControllerChanged {
                old_controller,
                new_controller,
                ..
            } => vec![*old_controller, *new_controller],
            Self::DocPointerUpdated { .. } => Vec::new(),
            Self::CredentialIssued { issuer, holder, .. } => vec![*issuer, *holder],
            Self::CredentialRevoked { issuer, .. } => vec![*issuer],
            Self::VerifierAuthorized { verifier } | Self::VerifierDeauthorized { verifier } => {
                vec![*verifier]
            }
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => vec![*previous_owner, *new_owner],
            Self::CredentialVerified { verifier, .. } => vec![*verifier],
            Self::AccessAttempt { accessor, .. } => vec![*accessor],
        }
    }
}

/// A journaled event with its position and transaction context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 0-based position within the owning journal.
    pub sequence: u64,
    pub timestamp: u64,
    pub caller: Principal,
    pub event: LedgerEvent,
}

/// Append-only event journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventJournal {
    records: Vec<EventRecord>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event under the given transaction.
    pub fn emit(&mut self, tx: &Tx, event: LedgerEvent) {
        let sequence = self.records.len() as u64;
        log::info!(
            "event #{sequence} {} by {} at {}",
            event.as_tag(),
            tx.caller,
            tx.timestamp
        );
        self.records.push(EventRecord {
            sequence,
            timestamp: tx.timestamp,
            caller: tx.caller,
            event,
        });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Every record's sequence must equal its position.
    pub(crate) fn check_sequences(&self) -> std::result::Result<(), String> {
        match self
            .records
            .iter()
            .enumerate()
            .find(|(pos, r)| r.sequence != *pos as u64)
        {
            Some((pos, r)) => Err(format!(
                "event at position {pos} carries sequence {}",
                r.sequence
            )),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
