//! Ledger snapshot persistence.
//!
//! The whole ledger is stored as a single JSON document:
//!
//! ```text
//! {data_dir}/
//! ├── ledger.json
//! └── ledger.lock
//! ```
//!
//! File format:
//! ```json
//! { "version": 1, "ledger": { ... Ledger ... } }
//! ```
//!
//! Writes go to a uniquely named temporary file in `data_dir` that is
//! persisted over the snapshot, so a crash mid-write leaves the previous
//! snapshot intact. Writers hold [`LedgerStore::lock`] from load through save
//! so concurrent processes never overwrite each other's commits.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

// ── File format constants ─────────────────────────────────────────────────────

const LEDGER_FILE_VERSION: u32 = 1;
const LEDGER_FILE: &str = "ledger.json";
const LOCK_FILE: &str = "ledger.lock";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LedgerFileRef<'a> {
    version: u32,
    ledger: &'a Ledger,
}

#[derive(Deserialize)]
struct LedgerFile {
    version: u32,
    ledger: Ledger,
}

// ── LedgerLock ────────────────────────────────────────────────────────────────

/// Exclusive advisory lock on a store's data directory.
///
/// Released when dropped.
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release {}: {e}", self.path.display());
        }
        log::trace!("released {}", self.path.display());
    }
}

// ── LedgerStore ───────────────────────────────────────────────────────────────

/// Filesystem-backed store for one [`Ledger`] snapshot.
pub struct LedgerStore {
    data_dir: PathBuf,
}

impl LedgerStore {
    /// Create a store rooted at `data_dir`. Nothing is touched on disk until
    /// the first [`save`](Self::save) or [`lock`](Self::lock).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    /// Return `true` if a snapshot has been saved.
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Block until this process holds the store's exclusive lock.
    ///
    /// The lock is advisory: it only orders callers that take it. Hold the
    /// returned guard from load through save.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Io` if the data directory or lock file cannot
    /// be created or locked.
    pub fn lock(&self) -> Result<LedgerLock> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        log::trace!("waiting for {}", path.display());
        FileExt::lock_exclusive(&file)?;
        log::trace!("acquired {}", path.display());
        Ok(LedgerLock { file, path })
    }

    /// Load the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if no snapshot exists,
    /// `LedgerError::InvalidFileFormat` for malformed files, an unknown
    /// format version, or state that breaks a ledger invariant (see
    /// [`Ledger::check_integrity`]), or `LedgerError::Io` for filesystem
    /// errors.
    pub fn load(&self) -> Result<Ledger> {
        let path = self.path();
        if !path.exists() {
            return Err(LedgerError::NotFound(format!(
                "no ledger at {}",
                path.display()
            )));
        }

        log::trace!("reading ledger snapshot {}", path.display());
        let bytes = std::fs::read(&path)?;
        let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!(
                "failed to parse ledger file {}: {e}",
                path.display()
            ))
        })?;

        if file.version != LEDGER_FILE_VERSION {
            return Err(LedgerError::InvalidFileFormat(format!(
                "unsupported ledger file version {} (expected {LEDGER_FILE_VERSION})",
                file.version
            )));
        }

        file.ledger.check_integrity().map_err(|reason| {
            LedgerError::InvalidFileFormat(format!(
                "inconsistent ledger file {}: {reason}",
                path.display()
            ))
        })?;

        Ok(file.ledger)
    }

    /// Write the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::SerializationError` if serialization fails, or
    /// `LedgerError::Io` for filesystem errors.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let file = LedgerFileRef {
            version: LEDGER_FILE_VERSION,
            ledger,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;

        let path = self.path();
        log::trace!("writing ledger snapshot {} ({} bytes)", path.display(), json.len());
        let mut tmp = tempfile::NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| LedgerError::Io(e.error))?;

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
