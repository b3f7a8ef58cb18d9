//! Scale test: 10K credentials issued, half revoked, snapshot round trip.

use idverse_ledger::{
    Command, Component, ContentHash, CredentialId, CredentialStatus, Ledger, LedgerStore,
    Principal, TimelineIndex, Tx,
};

fn build(n: u64) -> Ledger {
    let issuer = Principal::from_label("scale-issuer");
    let mut ledger = Ledger::deploy(&Tx::at(Principal::from_label("owner"), 1)).unwrap();

    for i in 0..n {
        ledger
            .apply(
                &Tx::at(issuer, 10 + i),
                Command::IssueCredential {
                    credential_id: CredentialId::from_label(&format!("cred-{i}")),
                    holder: Principal::from_label(&format!("holder-{}", i % 100)),
                    credential_hash: ContentHash::from_label(&format!("payload-{i}")),
                    cid: format!("ipfs://{i}"),
                },
            )
            .expect("issue should succeed");
    }
    for i in (0..n).step_by(2) {
        ledger
            .apply(
                &Tx::at(issuer, 10 + n + i),
                Command::RevokeCredential {
                    credential_id: CredentialId::from_label(&format!("cred-{i}")),
                },
            )
            .expect("revoke should succeed");
    }
    ledger
}

#[test]
fn stress_10k_credentials_issue_and_revoke() {
    let ledger = build(10_000);

    assert_eq!(ledger.credentials().len(), 10_000);
    assert_eq!(ledger.events(Component::Credential).len(), 15_000);
    for i in 0..10_000u64 {
        let expected = if i % 2 == 0 {
            CredentialStatus::Revoked
        } else {
            CredentialStatus::Active
        };
        assert_eq!(
            ledger.credential_status(&CredentialId::from_label(&format!("cred-{i}"))),
            expected
        );
    }
}

#[test]
fn stress_10k_snapshot_round_trip() {
    let ledger = build(10_000);
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::new(dir.path());

    store.save(&ledger).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.credentials().len(), 10_000);
    assert_eq!(
        loaded.events(Component::Credential),
        ledger.events(Component::Credential)
    );
}

#[test]
fn stress_10k_timeline_index() {
    let ledger = build(10_000);
    let index = TimelineIndex::build(&ledger);

    // 15K credential events plus the audit deployment event.
    assert_eq!(index.len(), 15_001);
    assert_eq!(
        index
            .for_credential(&CredentialId::from_label("cred-42"))
            .len(),
        2
    );
    assert_eq!(
        index
            .for_principal(&Principal::from_label("holder-7"))
            .len(),
        100
    );
}
