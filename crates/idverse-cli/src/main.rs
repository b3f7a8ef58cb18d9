//! Idverse CLI: `idv` command.
//!
//! Drives a ledger snapshot on disk: register identifiers, issue and revoke
//! credentials, manage the verifier allowlist, and inspect the event
//! journals. Every mutating command loads the snapshot, applies one command
//! as `--caller`, and writes the snapshot back only if the command succeeded.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use idverse_ledger::time::secs_to_rfc3339;
use idverse_ledger::{
    Bytes32, Command, Component, ContentHash, CredentialId, EventRecord, Identifier, Ledger,
    LedgerEvent, LedgerLock, LedgerStore, Principal, TimelineEntry, TimelineIndex, Tx,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| anyhow!("HOME not set; pass --data-dir or set IDVERSE_HOME"))?;
    Ok(PathBuf::from(home).join(".idverse").join("ledger"))
}

// ── Argument parsing helpers ──────────────────────────────────────────────────

fn parse_principal(s: &str) -> Result<Principal> {
    s.parse::<Principal>()
        .map_err(|e| anyhow!("invalid principal '{s}': {e}"))
}

/// Parse an identifier or credential id.
///
/// `0x` followed by 64 hex digits is taken literally; anything else is a
/// label and is hashed, so `did:idverse:alice` and `credential:001` work
/// as-is.
fn parse_id(s: &str) -> Result<Bytes32> {
    if s.starts_with("0x") && s.len() == 66 {
        return s
            .parse::<Bytes32>()
            .map_err(|e| anyhow!("invalid id '{s}': {e}"));
    }
    Ok(Bytes32::from_label(s))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Idverse CLI: register decentralized identifiers, issue and revoke
/// credentials, and keep a verification audit trail.
#[derive(Parser, Debug)]
#[command(
    name = "idv",
    about = "Idverse ledger CLI",
    version,
    long_about = "idv: Idverse ledger CLI\n\nRegister decentralized identifiers, issue and revoke credentials,\nmanage verifiers, and inspect the audit trail."
)]
struct Cli {
    /// Ledger data directory (default: ~/.idverse/ledger)
    #[arg(long, global = true, env = "IDVERSE_HOME")]
    data_dir: Option<PathBuf>,

    /// Authenticated principal submitting the command (0x + 40 hex digits)
    #[arg(long, global = true, env = "IDVERSE_CALLER")]
    caller: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new ledger; the caller becomes audit log owner
    Init,

    /// Manage decentralized identifiers
    Did {
        #[command(subcommand)]
        subcommand: DidCommands,
    },

    /// Issue, revoke, and inspect credentials
    Credential {
        #[command(subcommand)]
        subcommand: CredentialCommands,
    },

    /// Verifier allowlist, verification history, and access log
    Audit {
        #[command(subcommand)]
        subcommand: AuditCommands,
    },

    /// List journaled events
    Events {
        /// Only events of this component
        #[arg(long, value_enum)]
        component: Option<ComponentArg>,

        /// Only events with sequence >= SINCE (requires --component)
        #[arg(long, requires = "component")]
        since: Option<u64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who did what when, across all components
    Timeline {
        /// Events concerning a credential
        #[arg(long, conflicts_with_all = ["did", "principal"])]
        credential: Option<String>,

        /// Events concerning an identifier
        #[arg(long, conflicts_with = "principal")]
        did: Option<String>,

        /// Events a principal submitted or is named in
        #[arg(long)]
        principal: Option<String>,
    },

    /// Hash a label into an identifier and a principal address
    Hash {
        /// Label such as `did:idverse:alice` or `credential:001`
        label: String,
    },
}

#[derive(Subcommand, Debug)]
enum DidCommands {
    /// Register a new identifier
    Register {
        /// Identifier (0x hex or label)
        did: String,

        /// Controller (default: the caller)
        #[arg(long)]
        controller: Option<String>,

        /// Document pointer, e.g. ipfs://...
        #[arg(long, default_value = "")]
        pointer: String,
    },

    /// Hand the identifier to a new controller
    SetController {
        did: String,
        new_controller: String,
    },

    /// Replace the document pointer
    SetPointer { did: String, pointer: String },

    /// Show the record of an identifier
    Show { did: String },
}

#[derive(Subcommand, Debug)]
enum CredentialCommands {
    /// Issue a credential; the caller becomes its issuer
    Issue {
        /// Credential id (0x hex or label)
        id: String,

        /// Holder principal
        #[arg(long)]
        holder: String,

        /// Content hash of the credential document (0x + 64 hex digits)
        #[arg(long, conflicts_with = "file")]
        hash: Option<String>,

        /// Hash this file's contents as the credential hash
        #[arg(long)]
        file: Option<PathBuf>,

        /// Content pointer of the credential document
        #[arg(long, default_value = "")]
        cid: String,
    },

    /// Revoke a credential issued by the caller
    Revoke { id: String },

    /// Show the record of a credential
    Show { id: String },

    /// Print the trust status: unknown, active, or revoked
    Status { id: String },
}

#[derive(Subcommand, Debug)]
enum AuditCommands {
    /// Allow-list a verifier (owner only)
    AddVerifier { verifier: String },

    /// Remove a verifier from the allowlist (owner only)
    RemoveVerifier { verifier: String },

    /// Hand audit log ownership to another principal (owner only)
    TransferOwnership { new_owner: String },

    /// Log a verification outcome (allow-listed verifiers only)
    Verify {
        credential: String,

        /// Record a failed verification
        #[arg(long)]
        invalid: bool,
    },

    /// Log an access attempt
    Access {
        credential: String,

        /// Record a denied attempt
        #[arg(long)]
        denied: bool,
    },

    /// Show the verification history of a credential
    History { credential: String },

    /// Show the global access log, or one entry with --index
    AccessLog {
        #[arg(long)]
        index: Option<u64>,
    },

    /// List the owner and allow-listed verifiers
    Verifiers,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ComponentArg {
    Identity,
    Credential,
    Audit,
}

impl From<ComponentArg> for Component {
    fn from(arg: ComponentArg) -> Self {
        match arg {
            ComponentArg::Identity => Component::Identity,
            ComponentArg::Credential => Component::Credential,
            ComponentArg::Audit => Component::Audit,
        }
    }
}

// ── Session context ───────────────────────────────────────────────────────────

struct Session {
    store: LedgerStore,
    caller: Option<String>,
    verbose: bool,
}

impl Session {
    fn caller(&self) -> Result<Principal> {
        let raw = self
            .caller
            .as_deref()
            .ok_or_else(|| anyhow!("this command needs --caller (or IDVERSE_CALLER)"))?;
        parse_principal(raw)
    }

    /// Take the store's writer lock.
    fn lock(&self) -> Result<LedgerLock> {
        self.store.lock().with_context(|| {
            format!(
                "failed to lock ledger in {}",
                self.store.data_dir().display()
            )
        })
    }

    fn load(&self) -> Result<Ledger> {
        self.store.load().with_context(|| {
            format!(
                "failed to load ledger from {} (run `idv init` first)",
                self.store.data_dir().display()
            )
        })
    }

    /// Apply one command as the caller and persist on success.
    fn submit(&self, command: Command) -> Result<Vec<EventRecord>> {
        let caller = self.caller()?;
        let _lock = self.lock()?;
        let mut ledger = self.load()?;
        let name = command.name();

        let events = ledger
            .apply(&Tx::new(caller), command)
            .with_context(|| format!("{name} rejected"))?;
        self.store.save(&ledger).context("failed to save ledger")?;
        log::debug!("{name} committed {} event(s)", events.len());

        if self.verbose {
            for record in &events {
                print_record(None, record);
            }
        }
        Ok(events)
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let session = Session {
        store: LedgerStore::new(data_dir),
        caller: cli.caller,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Init => cmd_init(&session),
        Commands::Did { subcommand } => match subcommand {
            DidCommands::Register {
                did,
                controller,
                pointer,
            } => cmd_did_register(&session, &did, controller.as_deref(), pointer),
            DidCommands::SetController {
                did,
                new_controller,
            } => cmd_did_set_controller(&session, &did, &new_controller),
            DidCommands::SetPointer { did, pointer } => {
                cmd_did_set_pointer(&session, &did, pointer)
            }
            DidCommands::Show { did } => cmd_did_show(&session, &did),
        },
        Commands::Credential { subcommand } => match subcommand {
            CredentialCommands::Issue {
                id,
                holder,
                hash,
                file,
                cid,
            } => cmd_credential_issue(
                &session,
                &id,
                &holder,
                hash.as_deref(),
                file.as_deref(),
                cid,
            ),
            CredentialCommands::Revoke { id } => cmd_credential_revoke(&session, &id),
            CredentialCommands::Show { id } => cmd_credential_show(&session, &id),
            CredentialCommands::Status { id } => cmd_credential_status(&session, &id),
        },
        Commands::Audit { subcommand } => match subcommand {
            AuditCommands::AddVerifier { verifier } => {
                cmd_audit_add_verifier(&session, &verifier)
            }
            AuditCommands::RemoveVerifier { verifier } => {
                cmd_audit_remove_verifier(&session, &verifier)
            }
            AuditCommands::TransferOwnership { new_owner } => {
                cmd_audit_transfer_ownership(&session, &new_owner)
            }
            AuditCommands::Verify {
                credential,
                invalid,
            } => cmd_audit_verify(&session, &credential, !invalid),
            AuditCommands::Access { credential, denied } => {
                cmd_audit_access(&session, &credential, !denied)
            }
            AuditCommands::History { credential } => cmd_audit_history(&session, &credential),
            AuditCommands::AccessLog { index } => cmd_audit_access_log(&session, index),
            AuditCommands::Verifiers => cmd_audit_verifiers(&session),
        },
        Commands::Events {
            component,
            since,
            json,
        } => cmd_events(&session, component.map(Component::from), since, json),
        Commands::Timeline {
            credential,
            did,
            principal,
        } => cmd_timeline(
            &session,
            credential.as_deref(),
            did.as_deref(),
            principal.as_deref(),
        ),
        Commands::Hash { label } => cmd_hash(&label),
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::DidRegistered {
            did,
            controller,
            doc_pointer,
        } => format!("did {did} registered to {controller} ({doc_pointer})"),
        LedgerEvent::ControllerChanged {
            did,
            old_controller,
            new_controller,
        } => format!("did {did} controller {old_controller} -> {new_controller}"),
        LedgerEvent::DocPointerUpdated { did, doc_pointer } => {
            format!("did {did} pointer -> {doc_pointer}")
        }
        LedgerEvent::CredentialIssued {
            credential_id,
            issuer,
            holder,
            ..
        } => format!("credential {credential_id} issued by {issuer} to {holder}"),
        LedgerEvent::CredentialRevoked {
            credential_id,
            issuer,
        } => format!("credential {credential_id} revoked by {issuer}"),
        LedgerEvent::VerifierAuthorized { verifier } => format!("verifier {verifier} authorized"),
        LedgerEvent::VerifierDeauthorized { verifier } => {
            format!("verifier {verifier} deauthorized")
        }
        LedgerEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        } => format!("ownership {previous_owner} -> {new_owner}"),
        LedgerEvent::CredentialVerified {
            credential_id,
            verifier,
            result,
            ..
        } => format!(
            "credential {credential_id} verified by {verifier}: {}",
            if *result { "valid" } else { "invalid" }
        ),
        LedgerEvent::AccessAttempt {
            credential_id,
            accessor,
            success,
            ..
        } => format!(
            "credential {credential_id} accessed by {accessor}: {}",
            if *success { "granted" } else { "denied" }
        ),
    }
}

fn print_record(component: Option<Component>, record: &EventRecord) {
    let prefix = component
        .map(|c| format!("{:<10} ", c.as_str()))
        .unwrap_or_default();
    println!(
        "  {prefix}#{:<4} {}  {}",
        record.sequence,
        secs_to_rfc3339(record.timestamp),
        describe(&record.event)
    );
}

fn print_timeline(entries: &[&TimelineEntry]) {
    if entries.is_empty() {
        println!("No events.");
        return;
    }
    for entry in entries {
        print_record(Some(entry.component), &entry.record);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `idv init`
fn cmd_init(session: &Session) -> Result<()> {
    let owner = session.caller()?;
    let _lock = session.lock()?;
    if session.store.exists() {
        return Err(anyhow!(
            "ledger already exists at {}",
            session.store.path().display()
        ));
    }

    let ledger = Ledger::deploy(&Tx::new(owner)).context("failed to deploy ledger")?;
    session.store.save(&ledger).context("failed to save ledger")?;

    println!("Created ledger");
    println!("  Owner: {owner}");
    println!("  File:  {}", session.store.path().display());
    Ok(())
}

/// `idv did register DID [--controller P] [--pointer URI]`
fn cmd_did_register(
    session: &Session,
    did: &str,
    controller: Option<&str>,
    pointer: String,
) -> Result<()> {
    let id: Identifier = parse_id(did)?;
    let controller = match controller {
        Some(c) => parse_principal(c)?,
        None => session.caller()?,
    };

    session.submit(Command::RegisterDid {
        did: id,
        controller,
        document_pointer: pointer,
    })?;

    println!("Registered {did}");
    println!("  Identifier: {id}");
    println!("  Controller: {controller}");
    Ok(())
}

/// `idv did set-controller DID NEW_CONTROLLER`
fn cmd_did_set_controller(session: &Session, did: &str, new_controller: &str) -> Result<()> {
    let id = parse_id(did)?;
    let new_controller = parse_principal(new_controller)?;

    session.submit(Command::UpdateController {
        did: id,
        new_controller,
    })?;

    println!("Controller of {did} is now {new_controller}");
    Ok(())
}

/// `idv did set-pointer DID POINTER`
fn cmd_did_set_pointer(session: &Session, did: &str, pointer: String) -> Result<()> {
    let id = parse_id(did)?;
    session.submit(Command::UpdateDocumentPointer {
        did: id,
        document_pointer: pointer.clone(),
    })?;

    println!("Document pointer of {did} is now {pointer}");
    Ok(())
}

/// `idv did show DID`
fn cmd_did_show(session: &Session, did: &str) -> Result<()> {
    let id = parse_id(did)?;
    let ledger = session.load()?;

    let record = ledger
        .identities()
        .get(&id)
        .ok_or_else(|| anyhow!("{did} is not registered"))?;

    println!("Identifier: {did}");
    println!("  ID:         {id}");
    println!("  Controller: {}", record.controller);
    println!("  Document:   {}", record.document_pointer);

    if session.verbose {
        let index = TimelineIndex::build(&ledger);
        println!("  History:");
        print_timeline(&index.for_identifier(&id));
    }
    Ok(())
}

/// `idv credential issue ID --holder P (--hash H | --file PATH) [--cid CID]`
fn cmd_credential_issue(
    session: &Session,
    id: &str,
    holder: &str,
    hash: Option<&str>,
    file: Option<&Path>,
    cid: String,
) -> Result<()> {
    let credential_id: CredentialId = parse_id(id)?;
    let holder = parse_principal(holder)?;
    let credential_hash: ContentHash = match (hash, file) {
        (Some(h), _) => h.parse::<ContentHash>().map_err(|e| anyhow!("invalid hash '{h}': {e}"))?,
        (None, Some(path)) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ContentHash::digest(&bytes)
        }
        (None, None) => return Err(anyhow!("pass --hash or --file")),
    };

    session.submit(Command::IssueCredential {
        credential_id,
        holder,
        credential_hash,
        cid,
    })?;

    println!("Issued credential {id}");
    println!("  ID:     {credential_id}");
    println!("  Holder: {holder}");
    println!("  Hash:   {credential_hash}");
    Ok(())
}

/// `idv credential revoke ID`
fn cmd_credential_revoke(session: &Session, id: &str) -> Result<()> {
    let credential_id = parse_id(id)?;
    session.submit(Command::RevokeCredential { credential_id })?;

    println!("Revoked credential {id}");
    Ok(())
}

/// `idv credential show ID`
fn cmd_credential_show(session: &Session, id: &str) -> Result<()> {
    let credential_id = parse_id(id)?;
    let ledger = session.load()?;
    let record = ledger.credentials().get(&credential_id);

    if !record.exists() {
        return Err(anyhow!("credential {id} was never issued"));
    }

    println!("Credential: {id}");
    println!("  ID:      {credential_id}");
    println!("  Issuer:  {}", record.issuer);
    println!("  Holder:  {}", record.holder);
    println!("  Hash:    {}", record.credential_hash);
    println!("  CID:     {}", record.cid);
    println!("  Issued:  {}", secs_to_rfc3339(record.issued_at));
    println!("  Status:  {}", record.status());

    if session.verbose {
        let index = TimelineIndex::build(&ledger);
        println!("  History:");
        print_timeline(&index.for_credential(&credential_id));
    }
    Ok(())
}

/// `idv credential status ID`
fn cmd_credential_status(session: &Session, id: &str) -> Result<()> {
    let credential_id = parse_id(id)?;
    let ledger = session.load()?;
    println!("{}", ledger.credential_status(&credential_id));
    Ok(())
}

/// `idv audit add-verifier P`
fn cmd_audit_add_verifier(session: &Session, verifier: &str) -> Result<()> {
    let verifier = parse_principal(verifier)?;
    session.submit(Command::AddVerifier { verifier })?;
    println!("Authorized verifier {verifier}");
    Ok(())
}

/// `idv audit remove-verifier P`
fn cmd_audit_remove_verifier(session: &Session, verifier: &str) -> Result<()> {
    let verifier = parse_principal(verifier)?;
    session.submit(Command::RemoveVerifier { verifier })?;
    println!("Deauthorized verifier {verifier}");
    Ok(())
}

/// `idv audit transfer-ownership P`
fn cmd_audit_transfer_ownership(session: &Session, new_owner: &str) -> Result<()> {
    let new_owner = parse_principal(new_owner)?;
    session.submit(Command::TransferOwnership { new_owner })?;
    println!("Audit log owner is now {new_owner}");
    Ok(())
}

/// `idv audit verify CREDENTIAL [--invalid]`
fn cmd_audit_verify(session: &Session, credential: &str, result: bool) -> Result<()> {
    let credential_id = parse_id(credential)?;
    session.submit(Command::LogVerification {
        credential_id,
        result,
    })?;
    println!(
        "Logged {} verification of {credential}",
        if result { "valid" } else { "invalid" }
    );
    Ok(())
}

/// `idv audit access CREDENTIAL [--denied]`
fn cmd_audit_access(session: &Session, credential: &str, success: bool) -> Result<()> {
    let credential_id = parse_id(credential)?;
    session.submit(Command::LogAccess {
        credential_id,
        success,
    })?;
    println!(
        "Logged {} access to {credential}",
        if success { "granted" } else { "denied" }
    );
    Ok(())
}

/// `idv audit history CREDENTIAL`
fn cmd_audit_history(session: &Session, credential: &str) -> Result<()> {
    let credential_id = parse_id(credential)?;
    let ledger = session.load()?;
    let history = ledger.audit().verification_history(&credential_id);

    if history.is_empty() {
        println!("No verifications logged for {credential}");
        return Ok(());
    }

    println!("{:<44} {:<27} RESULT", "VERIFIER", "TIME");
    println!("{}", "-".repeat(80));
    for v in history {
        println!(
            "{:<44} {:<27} {}",
            v.verifier.to_string(),
            secs_to_rfc3339(v.timestamp),
            if v.result { "valid" } else { "invalid" }
        );
    }
    Ok(())
}

/// `idv audit access-log [--index N]`
fn cmd_audit_access_log(session: &Session, index: Option<u64>) -> Result<()> {
    let ledger = session.load()?;
    let audit = ledger.audit();

    let entries = match index {
        Some(i) => vec![(i, audit.access_log_entry(i)?)],
        None => (0..audit.access_log_count())
            .map(|i| audit.access_log_entry(i).map(|e| (i, e)))
            .collect::<idverse_ledger::Result<Vec<_>>>()?,
    };

    if entries.is_empty() {
        println!("Access log is empty");
        return Ok(());
    }

    println!("{:<6} {:<68} {:<44} {:<27} RESULT", "INDEX", "CREDENTIAL", "ACCESSOR", "TIME");
    println!("{}", "-".repeat(155));
    for (i, e) in entries {
        println!(
            "{:<6} {:<68} {:<44} {:<27} {}",
            i,
            e.credential_id.to_string(),
            e.accessor.to_string(),
            secs_to_rfc3339(e.timestamp),
            if e.success { "granted" } else { "denied" }
        );
    }
    Ok(())
}

/// `idv audit verifiers`
fn cmd_audit_verifiers(session: &Session) -> Result<()> {
    let ledger = session.load()?;
    let audit = ledger.audit();

    println!("Owner: {}", audit.owner());
    println!("Verifiers:");
    for verifier in audit.verifiers() {
        println!("  {verifier}");
    }
    Ok(())
}

/// `idv events [--component C] [--since N] [--json]`
fn cmd_events(
    session: &Session,
    component: Option<Component>,
    since: Option<u64>,
    json: bool,
) -> Result<()> {
    let ledger = session.load()?;
    let components = match component {
        Some(c) => vec![c],
        None => vec![Component::Identity, Component::Credential, Component::Audit],
    };

    let mut selected: Vec<(Component, &EventRecord)> = Vec::new();
    for c in components {
        let from = since.unwrap_or(0);
        selected.extend(
            ledger
                .events(c)
                .iter()
                .filter(|r| r.sequence >= from)
                .map(|r| (c, r)),
        );
    }

    if json {
        let value: Vec<serde_json::Value> = selected
            .iter()
            .map(|(c, r)| serde_json::json!({ "component": c, "record": r }))
            .collect();
        let out = serde_json::to_string_pretty(&value).context("failed to encode events")?;
        println!("{out}");
        return Ok(());
    }

    if selected.is_empty() {
        println!("No events.");
        return Ok(());
    }
    for (c, record) in selected {
        print_record(Some(c), record);
    }
    Ok(())
}

/// `idv timeline [--credential ID | --did ID | --principal P]`
fn cmd_timeline(
    session: &Session,
    credential: Option<&str>,
    did: Option<&str>,
    principal: Option<&str>,
) -> Result<()> {
    let ledger = session.load()?;
    let index = TimelineIndex::build(&ledger);

    let entries = if let Some(c) = credential {
        index.for_credential(&parse_id(c)?)
    } else if let Some(d) = did {
        index.for_identifier(&parse_id(d)?)
    } else if let Some(p) = principal {
        index.for_principal(&parse_principal(p)?)
    } else {
        index.all().iter().collect()
    };

    print_timeline(&entries);
    Ok(())
}

/// `idv hash LABEL`
fn cmd_hash(label: &str) -> Result<()> {
    println!("Identifier: {}", Bytes32::from_label(label));
    println!("Principal:  {}", Principal::from_label(label));
    Ok(())
}
