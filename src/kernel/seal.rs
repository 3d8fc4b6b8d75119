//! Seal generator: one-way commitments over final pipeline output.
//!
//! A seal is `SHA-256(SEAL_SALT || message)`. It proves a result was
//! produced without disclosing the input; it is not an encryption.
//!
//! Two sentinel seals stand in for results when a cycle cannot complete.
//! They share the genuine seal format, so callers recognise them by exact
//! equality only.

use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Static salt prefixed to every sealed message.
const SEAL_SALT: &[u8] = b"OMEGA_CORE_SECRET";

/// Hex form of [`Seal::ERROR_STATE`].
pub const ERROR_SEAL: &str = "2e9b78ad7e55f89ff1433e856fe832ec613bf597dd42386a58999dd2d14d9385";

/// Hex form of [`Seal::LIMIT_EXCEEDED`].
pub const LIMIT_SEAL: &str = "cab1c359e4c8dfa5b7c3631a22ea4f29112973a204edf755a1feb91a3b39f71b";

/// 256-bit commitment digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seal([u8; 32]);

/// What a returned seal means to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealStatus {
    /// Commitment over a completed cycle.
    Genuine,
    /// The input exceeded the size cap; the cycle never ran.
    LimitExceeded,
    /// The cycle failed internally.
    ErrorState,
}

impl Seal {
    /// Seal of the literal `"ERROR_STATE"`.
    pub const ERROR_STATE: Seal = Seal([
        0x2e, 0x9b, 0x78, 0xad, 0x7e, 0x55, 0xf8, 0x9f, 0xf1, 0x43, 0x3e, 0x85, 0x6f, 0xe8, 0x32,
        0xec, 0x61, 0x3b, 0xf5, 0x97, 0xdd, 0x42, 0x38, 0x6a, 0x58, 0x99, 0x9d, 0xd2, 0xd1, 0x4d,
        0x93, 0x85,
    ]);

    /// Seal of the literal `"LIMIT_EXCEEDED"`.
    pub const LIMIT_EXCEEDED: Seal = Seal([
        0xca, 0xb1, 0xc3, 0x59, 0xe4, 0xc8, 0xdf, 0xa5, 0xb7, 0xc3, 0x63, 0x1a, 0x22, 0xea, 0x4f,
        0x29, 0x11, 0x29, 0x73, 0xa2, 0x04, 0xed, 0xf7, 0x55, 0xa1, 0xfe, 0xb9, 0x1a, 0x3b, 0x39,
        0xf7, 0x1b,
    ]);

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 64-character lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Classify by exact comparison against the sentinels.
    pub fn status(&self) -> SealStatus {
        if *self == Self::ERROR_STATE {
            SealStatus::ErrorState
        } else if *self == Self::LIMIT_EXCEEDED {
            SealStatus::LimitExceeded
        } else {
            SealStatus::Genuine
        }
    }

    /// Whether this is one of the two sentinel seals.
    pub fn is_sentinel(&self) -> bool {
        self.status() != SealStatus::Genuine
    }
}

impl std::fmt::Debug for Seal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seal({})", self.to_hex())
    }
}

impl std::fmt::Display for Seal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl PartialEq<str> for Seal {
    fn eq(&self, other: &str) -> bool {
        self.to_hex() == other
    }
}

impl PartialEq<&str> for Seal {
    fn eq(&self, other: &&str) -> bool {
        self.to_hex() == *other
    }
}

/// Error parsing a seal from its hex form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid seal: expected 64 hex characters")]
pub struct ParseSealError;

impl FromStr for Seal {
    type Err = ParseSealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseSealError)?;
        Ok(Seal(bytes))
    }
}

/// Seal `message` under the static salt.
pub fn seal(message: &str) -> Seal {
    let mut hasher = Sha256::new();
    hasher.update(SEAL_SALT);
    hasher.update(message.as_bytes());
    Seal(hasher.finalize().into())
}
