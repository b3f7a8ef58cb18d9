//! Concurrency test: many `idv` processes writing one data directory.
//!
//! Every process loads, applies, and saves the same snapshot; none of the
//! committed events may be lost.
//!
//! Registered as a [[test]] in the idverse-cli crate so that
//! CARGO_BIN_EXE_idv is available.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;

use idverse_ledger::{Component, ContentHash, CredentialId, LedgerStore, Principal};

const WRITERS: usize = 24;

fn idv(data_dir: &Path, caller: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_idv"))
        .env_remove("IDVERSE_HOME")
        .env_remove("IDVERSE_CALLER")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--caller")
        .arg(caller)
        .args(args)
        .output()
        .expect("failed to execute idv")
}

fn init(dir: &Path) {
    let owner = Principal::from_label("owner").to_string();
    let output = idv(dir, &owner, &["init"]);
    assert!(
        output.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn spawn_writers(dir: &Path, args: fn(usize) -> Vec<String>) -> Vec<Output> {
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let dir: PathBuf = dir.to_path_buf();
            thread::spawn(move || {
                let caller = Principal::from_label(&format!("viewer-{i}")).to_string();
                let args = args(i);
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                idv(&dir, &caller, &args)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn stress_concurrent_access_logging_keeps_every_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    init(dir);

    let outputs = spawn_writers(dir, |i| {
        let mut args = vec!["audit".to_string(), "access".into(), "credential:shared".into()];
        if i % 3 == 0 {
            args.push("--denied".into());
        }
        args
    });
    for (i, output) in outputs.iter().enumerate() {
        assert!(
            output.status.success(),
            "writer {i} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let ledger = LedgerStore::new(dir).load().expect("snapshot stays loadable");
    assert_eq!(ledger.audit().access_log_count(), WRITERS as u64);

    let mut accessors: Vec<Principal> = (0..ledger.audit().access_log_count())
        .map(|i| ledger.audit().access_log_entry(i).unwrap().accessor)
        .collect();
    accessors.sort();
    let mut expected: Vec<Principal> = (0..WRITERS)
        .map(|i| Principal::from_label(&format!("viewer-{i}")))
        .collect();
    expected.sort();
    assert_eq!(accessors, expected);

    // Deployment event plus one per writer, numbered without gaps.
    let seqs: Vec<u64> = ledger
        .events(Component::Audit)
        .iter()
        .map(|r| r.sequence)
        .collect();
    assert_eq!(seqs, (0..=WRITERS as u64).collect::<Vec<u64>>());
}

#[test]
fn stress_concurrent_issuers_race_for_one_id() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    init(dir);

    let outputs = spawn_writers(dir, |i| {
        vec![
            "credential".to_string(),
            "issue".into(),
            "credential:contested".into(),
            "--holder".into(),
            Principal::from_label("holder").to_string(),
            "--hash".into(),
            ContentHash::from_label(&format!("payload-{i}")).to_string(),
        ]
    });
    let winners = outputs.iter().filter(|o| o.status.success()).count();
    assert_eq!(winners, 1, "exactly one issuer may claim the id");

    let ledger = LedgerStore::new(dir).load().unwrap();
    let record = ledger
        .credentials()
        .get(&CredentialId::from_label("credential:contested"));
    assert!(record.exists());
    assert_eq!(ledger.events(Component::Credential).len(), 1);
}
