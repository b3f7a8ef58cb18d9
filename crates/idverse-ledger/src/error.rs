//! Error types for the IDverse trust ledger.
//!
//! Protocol failures are precondition violations detected before any state
//! change; a call that returns one of them has had no effect. Storage and
//! encoding failures only arise at the persistence and parsing edges.

/// Ledger error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    // ── Identity registry ────────────────────────────────────────────────
    #[error("DID already registered: {0}")]
    AlreadyRegistered(String),

    #[error("only controller: {0}")]
    NotController(String),

    // ── Credential registry ──────────────────────────────────────────────
    #[error("credential exists: {0}")]
    AlreadyExists(String),

    #[error("only issuer: {0}")]
    NotIssuer(String),

    #[error("already revoked: {0}")]
    AlreadyRevoked(String),

    // ── Audit log ────────────────────────────────────────────────────────
    #[error("Only owner can call this")]
    NotOwner,

    #[error("Invalid address")]
    InvalidPrincipal,

    #[error("Already authorized: {0}")]
    AlreadyAuthorized(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Cannot remove owner")]
    CannotRemoveOwner,

    #[error("Already owner")]
    AlreadySelf,

    #[error("Not authorized verifier: {0}")]
    NotAuthorizedVerifier(String),

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: u64, len: u64 },

    // ── Encoding and storage ─────────────────────────────────────────────
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller is not the principal the operation is gated on.
    Unauthorized,
    /// The target already exists or is already in the requested state.
    Conflict,
    /// An argument can never be accepted.
    InvalidArgument,
    /// The requested change would be a no-op or would break an ownership rule.
    AlreadySatisfied,
    /// Encoding, filesystem, or snapshot failure outside the protocol.
    Storage,
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotController(_)
            | Self::NotIssuer(_)
            | Self::NotOwner
            | Self::NotAuthorizedVerifier(_) => ErrorKind::Unauthorized,
            Self::AlreadyRegistered(_)
            | Self::AlreadyExists(_)
            | Self::AlreadyRevoked(_)
            | Self::AlreadyAuthorized(_) => ErrorKind::Conflict,
            Self::InvalidPrincipal | Self::IndexOutOfBounds { .. } => ErrorKind::InvalidArgument,
            Self::NotAuthorized(_) | Self::CannotRemoveOwner | Self::AlreadySelf => {
                ErrorKind::AlreadySatisfied
            }
            Self::InvalidEncoding(_)
            | Self::NotFound(_)
            | Self::SerializationError(_)
            | Self::InvalidFileFormat(_)
            | Self::Io(_) => ErrorKind::Storage,
        }
    }

    /// Whether this error is a protocol precondition failure.
    pub fn is_protocol(&self) -> bool {
        self.kind() != ErrorKind::Storage
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
