//! Ledger facade: the three components held side by side.
//!
//! The components share no state; the facade only routes each [`Command`]
//! to the one component it targets so a host can persist and drive them as
//! a unit. Every call is independently atomic: there is no cross-component
//! transaction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audit::AuditLog;
use crate::credential::{CredentialRegistry, CredentialStatus};
use crate::error::Result;
use crate::events::EventRecord;
use crate::identity::IdentityRegistry;
use crate::primitives::{ContentHash, CredentialId, Identifier, Principal, Tx};

/// Which component a command or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Identity,
    Credential,
    Audit,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Credential => "credential",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutating ledger operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    RegisterDid {
        did: Identifier,
        controller: Principal,
        document_pointer: String,
    },
    UpdateController {
        did: Identifier,
        new_controller: Principal,
    },
    UpdateDocumentPointer {
        did: Identifier,
        document_pointer: String,
    },
    IssueCredential {
        credential_id: CredentialId,
        holder: Principal,
        credential_hash: ContentHash,
        cid: String,
    },
    RevokeCredential {
        credential_id: CredentialId,
    },
    AddVerifier {
        verifier: Principal,
    },
    RemoveVerifier {
        verifier: Principal,
    },
    TransferOwnership {
        new_owner: Principal,
    },
    LogVerification {
        credential_id: CredentialId,
        result: bool,
    },
    LogAccess {
        credential_id: CredentialId,
        success: bool,
    },
}

impl Command {
    /// The component this command mutates.
    pub fn component(&self) -> Component {
        match self {
            Self::RegisterDid { .. }
            | Self::UpdateController { .. }
            | Self::UpdateDocumentPointer { .. } => Component::Identity,
            Self::IssueCredential { .. } | Self::RevokeCredential { .. } => Component::Credential,
            Self::AddVerifier { .. }
            | Self::RemoveVerifier { .. }
            | Self::TransferOwnership { .. }
            | Self::LogVerification { .. }
            | Self::LogAccess { .. } => Component::Audit,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterDid { .. } => "register_did",
            Self::UpdateController { .. } => "update_controller",
            Self::UpdateDocumentPointer { .. } => "update_document_pointer",
            Self::IssueCredential { .. } => "issue_credential",
            Self::RevokeCredential { .. } => "revoke_credential",
            Self::AddVerifier { .. } => "add_verifier",
            Self::RemoveVerifier { .. } => "remove_verifier",
            Self::TransferOwnership { .. } => "transfer_ownership",
            Self::LogVerification { .. } => "log_verification",
            Self::LogAccess { .. } => "log_access",
        }
    }
}

/// The identity registry, credential registry, and audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    identities: IdentityRegistry,
    credentials: CredentialRegistry,
    audit: AuditLog,
}

impl Ledger {
    /// Deploy a fresh ledger. The caller owns the audit log.
    pub fn deploy(tx: &Tx) -> Result<Self> {
        let audit = AuditLog::deploy(tx)?;
        log::info!("ledger deployed, audit owner {}", tx.caller);
        Ok(Self {
            identities: IdentityRegistry::new(),
            credentials: CredentialRegistry::new(),
            audit,
        })
    }

    /// Apply one command as `tx.caller`.
    ///
    /// Returns the events the call appended. On error nothing was changed
    /// and nothing was appended.
    pub fn apply(&mut self, tx: &Tx, command: Command) -> Result<Vec<EventRecord>> {
        let component = command.component();
        let name = command.name();
        let before = self.events(component).len();

        let outcome = match command {
            Command::RegisterDid {
                did,
                controller,
                document_pointer,
            } => self
                .identities
                .register(tx, did, controller, document_pointer),
            Command::UpdateController {
                did,
                new_controller,
            } => self.identities.update_controller(tx, did, new_controller),
            Command::UpdateDocumentPointer {
                did,
                document_pointer,
            } => self
                .identities
                .update_document_pointer(tx, did, document_pointer),
            Command::IssueCredential {
                credential_id,
                holder,
                credential_hash,
                cid,
            } => self
                .credentials
                .issue(tx, credential_id, holder, credential_hash, cid),
            Command::RevokeCredential { credential_id } => {
                self.credentials.revoke(tx, credential_id)
            }
            Command::AddVerifier { verifier } => self.audit.add_verifier(tx, verifier),
            Command::RemoveVerifier { verifier } => self.audit.remove_verifier(tx, verifier),
            Command::TransferOwnership { new_owner } => {
                self.audit.transfer_ownership(tx, new_owner)
            }
            Command::LogVerification {
                credential_id,
                result,
            } => self.audit.log_verification(tx, credential_id, result),
            Command::LogAccess {
                credential_id,
                success,
            } => {
                self.audit.log_access(tx, credential_id, success);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            log::debug!("{name} by {} rejected: {e}", tx.caller);
            return Err(e);
        }
        Ok(self.events(component)[before..].to_vec())
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    pub fn credentials(&self) -> &CredentialRegistry {
        &self.credentials
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Trust status of a credential.
    pub fn credential_status(&self, credential_id: &CredentialId) -> CredentialStatus {
        self.credentials.get(credential_id).status()
    }

    /// Check the state invariants every component upholds through its own
    /// operations. Only needed for state that did not come from [`deploy`]
    /// and [`apply`], such as a snapshot read from disk.
    ///
    /// Returns a description of the first violation found.
    ///
    /// [`deploy`]: Self::deploy
    /// [`apply`]: Self::apply
    pub fn check_integrity(&self) -> std::result::Result<(), String> {
        self.identities.check_integrity()?;
        self.credentials.check_integrity()?;
        self.audit.check_integrity()
    }

    /// Event journal of one component.
    pub fn events(&self, component: Component) -> &[EventRecord] {
        match component {
            Component::Identity => self.identities.events(),
            Component::Credential => self.credentials.events(),
            Component::Audit => self.audit.events(),
        }
    }
}
