//! Primitive value types shared by every ledger component.
//!
//! Principals and 32-byte hashes are plain `Copy` values. Records hold
//! copies of them, never references into another component's state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

/// Decode `0x`-prefixed (or bare) hex into exactly `N` bytes.
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits)
        .map_err(|e| LedgerError::InvalidEncoding(format!("invalid hex '{s}': {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        LedgerError::InvalidEncoding(format!("expected {N} bytes, got {} in '{s}'", v.len()))
    })
}

// ── Principal ─────────────────────────────────────────────────────────────────

/// An authenticated actor identity, as supplied by the signing layer.
///
/// Twenty bytes, rendered as a `0x`-prefixed hex address. The all-zero value
/// is the null principal and never owns anything.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    /// The null principal.
    pub const ZERO: Principal = Principal([0u8; 20]);

    /// Whether this is the null principal.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Derive a principal from a label (last 20 bytes of SHA-256).
    ///
    /// Useful for fixtures and local tooling; production principals come
    /// from the signing layer.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({self})")
    }
}

impl FromStr for Principal {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Bytes32 ───────────────────────────────────────────────────────────────────

/// An opaque fixed-size 32-byte hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32(pub [u8; 32]);

/// Handle naming a controllable identity record.
pub type Identifier = Bytes32;

/// Key of a credential record.
pub type CredentialId = Bytes32;

/// Content hash of an off-ledger credential payload.
pub type ContentHash = Bytes32;

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// SHA-256 of a UTF-8 label such as `did:idverse:alice123`.
    pub fn from_label(label: &str) -> Self {
        Self(Sha256::digest(label.as_bytes()).into())
    }

    /// SHA-256 of arbitrary payload bytes.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({self})")
    }
}

impl FromStr for Bytes32 {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Tx ────────────────────────────────────────────────────────────────────────

/// Context of one mutating call: who is calling and at what ledger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub caller: Principal,
    /// Ledger time in Unix seconds.
    pub timestamp: u64,
}

impl Tx {
    /// A transaction stamped with the current wall-clock time.
    pub fn new(caller: Principal) -> Self {
        Self {
            caller,
            timestamp: crate::time::now_secs(),
        }
    }

    /// A transaction at an explicit ledger time.
    pub fn at(caller: Principal, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}
