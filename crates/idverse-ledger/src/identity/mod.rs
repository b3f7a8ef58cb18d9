//! Identity registry: identifier ownership and document pointers.
//!
//! An identifier is registered once, never deleted, and mutated only by
//! its current controller. Controller transfer is a plain capability
//! handoff with no limit on how many times it happens.

pub mod record;
pub mod registry;

pub use record::IdentifierRecord;
pub use registry::IdentityRegistry;
