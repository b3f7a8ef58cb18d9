//! Edge case tests: zero principals, unknown ids, ownership transfer
//! asymmetry, allowlist corner cases, and error classification.

use idverse_ledger::{
    AuditLog, Command, Component, ContentHash, CredentialId, ErrorKind, Identifier, Ledger,
    LedgerError, LedgerEvent, Principal, Tx,
};

fn p(label: &str) -> Principal {
    Principal::from_label(label)
}

fn deployed() -> (Ledger, Principal) {
    let owner = p("owner");
    (Ledger::deploy(&Tx::at(owner, 1)).unwrap(), owner)
}

// === Identity Edge Cases ===

#[test]
fn edge_register_with_zero_controller_rejected() {
    let (mut ledger, _) = deployed();
    let err = ledger
        .apply(
            &Tx::at(p("alice"), 2),
            Command::RegisterDid {
                did: Identifier::from_label("did:idverse:ghost"),
                controller: Principal::ZERO,
                document_pointer: String::new(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrincipal));
    assert!(ledger.identities().is_empty());
}

#[test]
fn edge_register_on_behalf_of_another_controller() {
    let (mut ledger, _) = deployed();
    let did = Identifier::from_label("did:idverse:bob");
    ledger
        .apply(
            &Tx::at(p("registrar"), 2),
            Command::RegisterDid {
                did,
                controller: p("bob"),
                document_pointer: String::new(),
            },
        )
        .unwrap();
    assert_eq!(ledger.identities().controller(&did), p("bob"));
    assert_eq!(ledger.identities().document_pointer(&did), "");

    let err = ledger
        .apply(
            &Tx::at(p("registrar"), 3),
            Command::UpdateDocumentPointer {
                did,
                document_pointer: "ipfs://x".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotController(_)));
}

#[test]
fn edge_update_unregistered_identifier_is_not_controller() {
    let (mut ledger, _) = deployed();
    let err = ledger
        .apply(
            &Tx::at(p("alice"), 2),
            Command::UpdateController {
                did: Identifier::from_label("never"),
                new_controller: p("bob"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotController(_)));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(ledger.events(Component::Identity).is_empty());
}

#[test]
fn edge_unknown_identifier_reads_zero() {
    let (ledger, _) = deployed();
    let did = Identifier::from_label("nobody");
    assert!(ledger.identities().controller(&did).is_zero());
    assert_eq!(ledger.identities().document_pointer(&did), "");
    assert!(ledger.identities().get(&did).is_none());
}

// === Credential Edge Cases ===

#[test]
fn edge_revoke_unknown_credential_is_not_issuer() {
    let (mut ledger, _) = deployed();
    for caller in [p("anyone"), Principal::ZERO] {
        let err = ledger
            .apply(
                &Tx::at(caller, 2),
                Command::RevokeCredential {
                    credential_id: CredentialId::from_label("missing"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotIssuer(_)));
    }
}

#[test]
fn edge_zero_caller_can_neither_issue_nor_revoke() {
    let (mut ledger, _) = deployed();
    let id = CredentialId::from_label("orphan");
    let issue = Command::IssueCredential {
        credential_id: id,
        holder: p("holder"),
        credential_hash: ContentHash::from_label("orphan"),
        cid: "ipfs://orphan".into(),
    };
    let revoke = Command::RevokeCredential { credential_id: id };

    let err = ledger
        .apply(&Tx::at(Principal::ZERO, 2), issue.clone())
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrincipal));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(ledger.credentials().is_empty());
    assert!(ledger.events(Component::Credential).is_empty());

    ledger.apply(&Tx::at(p("issuer"), 3), issue).unwrap();
    let err = ledger
        .apply(&Tx::at(Principal::ZERO, 4), revoke)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotIssuer(_)));
    assert!(!ledger.credentials().get(&id).revoked);
    assert_eq!(ledger.events(Component::Credential).len(), 1);
}

#[test]
fn edge_duplicate_issue_fails_for_original_issuer_too() {
    let (mut ledger, _) = deployed();
    let cmd = Command::IssueCredential {
        credential_id: CredentialId::from_label("dup"),
        holder: p("holder"),
        credential_hash: ContentHash::from_label("v1"),
        cid: "ipfs://v1".into(),
    };
    ledger.apply(&Tx::at(p("issuer"), 2), cmd.clone()).unwrap();
    let err = ledger.apply(&Tx::at(p("issuer"), 3), cmd).unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists(_)));
    assert_eq!(
        ledger
            .credentials()
            .get(&CredentialId::from_label("dup"))
            .issued_at,
        2
    );
}

// === Audit Edge Cases ===

#[test]
fn edge_deploy_with_zero_caller_rejected() {
    assert!(matches!(
        AuditLog::deploy(&Tx::at(Principal::ZERO, 1)),
        Err(LedgerError::InvalidPrincipal)
    ));
    assert!(Ledger::deploy(&Tx::at(Principal::ZERO, 1)).is_err());
}

#[test]
fn edge_owner_cannot_be_removed() {
    let (mut ledger, owner) = deployed();
    let err = ledger
        .apply(&Tx::at(owner, 2), Command::RemoveVerifier { verifier: owner })
        .unwrap_err();
    assert!(matches!(err, LedgerError::CannotRemoveOwner));
    assert!(ledger.audit().is_authorized_verifier(&owner));
}

#[test]
fn edge_remove_absent_verifier_is_not_authorized() {
    let (mut ledger, owner) = deployed();
    let err = ledger
        .apply(
            &Tx::at(owner, 2),
            Command::RemoveVerifier {
                verifier: p("never-added"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotAuthorized(_)));
    assert_eq!(err.kind(), ErrorKind::AlreadySatisfied);
}

#[test]
fn edge_add_zero_or_existing_verifier_rejected() {
    let (mut ledger, owner) = deployed();
    let err = ledger
        .apply(
            &Tx::at(owner, 2),
            Command::AddVerifier {
                verifier: Principal::ZERO,
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrincipal));

    let err = ledger
        .apply(&Tx::at(owner, 3), Command::AddVerifier { verifier: owner })
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyAuthorized(_)));
}

#[test]
fn edge_transfer_keeps_previous_owner_as_verifier() {
    let (mut ledger, owner) = deployed();
    let next = p("next-owner");

    ledger
        .apply(&Tx::at(owner, 2), Command::TransferOwnership { new_owner: next })
        .unwrap();

    let audit = ledger.audit();
    assert_eq!(audit.owner(), next);
    assert!(audit.is_authorized_verifier(&next));
    assert!(audit.is_authorized_verifier(&owner));

    // The old owner lost management rights but can still verify.
    let err = ledger
        .apply(
            &Tx::at(owner, 3),
            Command::AddVerifier {
                verifier: p("someone"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotOwner));
    ledger
        .apply(
            &Tx::at(owner, 4),
            Command::LogVerification {
                credential_id: CredentialId::from_label("c"),
                result: true,
            },
        )
        .unwrap();

    // The new owner can drop the old one explicitly.
    ledger
        .apply(&Tx::at(next, 5), Command::RemoveVerifier { verifier: owner })
        .unwrap();
    assert!(!ledger.audit().is_authorized_verifier(&owner));
}

#[test]
fn edge_transfer_to_existing_verifier_emits_no_authorization() {
    let (mut ledger, owner) = deployed();
    let v = p("verifier");
    ledger
        .apply(&Tx::at(owner, 2), Command::AddVerifier { verifier: v })
        .unwrap();

    let events = ledger
        .apply(&Tx::at(owner, 3), Command::TransferOwnership { new_owner: v })
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].event,
        LedgerEvent::OwnershipTransferred {
            previous_owner: owner,
            new_owner: v
        }
    );
}

#[test]
fn edge_transfer_to_self_or_zero_rejected() {
    let (mut ledger, owner) = deployed();
    let err = ledger
        .apply(&Tx::at(owner, 2), Command::TransferOwnership { new_owner: owner })
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadySelf));

    let err = ledger
        .apply(
            &Tx::at(owner, 3),
            Command::TransferOwnership {
                new_owner: Principal::ZERO,
            },
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrincipal));
    assert_eq!(ledger.audit().owner(), owner);
}

#[test]
fn edge_access_log_out_of_bounds() {
    let (ledger, _) = deployed();
    let err = ledger.audit().access_log_entry(0).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::IndexOutOfBounds { index: 0, len: 0 }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn edge_access_from_zero_principal_is_logged() {
    let (mut ledger, _) = deployed();
    ledger
        .apply(
            &Tx::at(Principal::ZERO, 2),
            Command::LogAccess {
                credential_id: CredentialId::ZERO,
                success: false,
            },
        )
        .unwrap();
    let entry = ledger.audit().access_log_entry(0).unwrap();
    assert!(entry.accessor.is_zero());
    assert!(entry.credential_id.is_zero());
}
