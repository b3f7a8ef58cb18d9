//! Stress test: 100 principals each register an identifier and receive a
//! credential; every record stays attributed to the right principal.

use std::collections::HashSet;

use idverse_ledger::{
    Command, ContentHash, CredentialId, CredentialStatus, Identifier, Ledger, LedgerError,
    Principal, Tx,
};

#[test]
fn stress_100_principals_register_distinct_identifiers() {
    let mut ledger = Ledger::deploy(&Tx::at(Principal::from_label("owner"), 1)).unwrap();
    let mut seen = HashSet::new();

    for i in 0..100 {
        let holder = Principal::from_label(&format!("holder-{i}"));
        let did = Identifier::from_label(&format!("did:idverse:holder-{i}"));
        assert!(seen.insert(did), "Duplicate identifier for holder-{i}");

        ledger
            .apply(
                &Tx::at(holder, 10 + i),
                Command::RegisterDid {
                    did,
                    controller: holder,
                    document_pointer: format!("ipfs://doc-{i}"),
                },
            )
            .expect("fresh identifier should register");
    }

    assert_eq!(ledger.identities().len(), 100);
    for i in 0..100 {
        let did = Identifier::from_label(&format!("did:idverse:holder-{i}"));
        assert_eq!(
            ledger.identities().controller(&did),
            Principal::from_label(&format!("holder-{i}"))
        );
    }
}

#[test]
fn stress_100_principals_cannot_touch_each_other() {
    let mut ledger = Ledger::deploy(&Tx::at(Principal::from_label("owner"), 1)).unwrap();
    let issuers: Vec<Principal> = (0..100)
        .map(|i| Principal::from_label(&format!("issuer-{i}")))
        .collect();

    for (i, issuer) in issuers.iter().enumerate() {
        ledger
            .apply(
                &Tx::at(*issuer, 100),
                Command::IssueCredential {
                    credential_id: CredentialId::from_label(&format!("cred-{i}")),
                    holder: Principal::from_label("shared-holder"),
                    credential_hash: ContentHash::from_label(&format!("payload-{i}")),
                    cid: String::new(),
                },
            )
            .unwrap();
    }

    // Every issuer tries to revoke its neighbour's credential.
    for (i, issuer) in issuers.iter().enumerate() {
        let neighbour = CredentialId::from_label(&format!("cred-{}", (i + 1) % 100));
        let err = ledger
            .apply(
                &Tx::at(*issuer, 200),
                Command::RevokeCredential {
                    credential_id: neighbour,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotIssuer(_)));
    }

    assert_eq!(
        ledger
            .credentials()
            .held_by(&Principal::from_label("shared-holder"))
            .len(),
        100
    );
    for i in 0..100 {
        let id = CredentialId::from_label(&format!("cred-{i}"));
        assert_eq!(ledger.credential_status(&id), CredentialStatus::Active);
        assert_eq!(ledger.credentials().issued_by(&issuers[i]), vec![id]);
    }
}
