//! Filesystem persistence for the ledger.

pub mod ledger_store;

pub use ledger_store::{LedgerLock, LedgerStore};
