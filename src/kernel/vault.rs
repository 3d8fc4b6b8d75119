//! Secret provider abstraction for authorization key derivation.
//!
//! Every caller key is `HMAC-SHA256(secret, identifier)`. The secret sits
//! behind [`SecretProvider`] so the kernel never touches it directly and a
//! host can swap or rotate it without changing kernel logic.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Process-wide default secret used by [`derive_auth_key`].
const DEFAULT_AUTH_SECRET: &[u8] = b"K_MATH_SECRET";

/// Length of a derived authorization key in bytes.
pub const AUTH_KEY_LEN: usize = 32;

/// Key derivation error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyDerivationError {
    /// Identifiers must contain at least one character.
    #[error("identifier must be a non-empty string")]
    EmptyIdentifier,
    /// The provider's secret was rejected by the MAC.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}

/// Derived authorization key for one identifier.
///
/// Debug output always shows `__REDACTED__` so keys cannot leak through
/// logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey([u8; AUTH_KEY_LEN]);

impl AuthKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; AUTH_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Expose the key bytes. Use only when handing the key to a caller.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Compare against a candidate key without early exit on content.
    ///
    /// A length mismatch is a rejection.
    pub fn ct_matches(&self, candidate: &[u8]) -> bool {
        if candidate.len() != AUTH_KEY_LEN {
            return false;
        }
        self.0.as_slice().ct_eq(candidate).into()
    }
}

impl AsRef<[u8]> for AuthKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("__REDACTED__")
    }
}

/// Source of authorization keys.
///
/// Only kernel code calls this directly. Callers receive their key once,
/// out of band, and present it back when constructing a kernel.
pub trait SecretProvider: Send + Sync {
    /// Derive the authorization key for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDerivationError::EmptyIdentifier`] for an empty identifier,
    /// or [`KeyDerivationError::InvalidSecret`] if the secret is unusable.
    fn derive_key(&self, identifier: &str) -> Result<AuthKey, KeyDerivationError>;
}

/// Static shared secret, keyed with HMAC-SHA256.
///
/// There is no rotation: a new secret means a new provider.
#[derive(Clone)]
pub struct StaticSecret {
    secret: Vec<u8>,
}

impl StaticSecret {
    /// Create a provider over the given secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Default for StaticSecret {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_SECRET)
    }
}

impl std::fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecret")
            .field("secret", &"__REDACTED__")
            .finish()
    }
}

impl SecretProvider for StaticSecret {
    fn derive_key(&self, identifier: &str) -> Result<AuthKey, KeyDerivationError> {
        if identifier.is_empty() {
            return Err(KeyDerivationError::EmptyIdentifier);
        }
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| KeyDerivationError::InvalidSecret(e.to_string()))?;
        mac.update(identifier.as_bytes());
        Ok(AuthKey(mac.finalize().into_bytes().into()))
    }
}

/// Derive the authorization key for `identifier` under the default secret.
///
/// # Errors
///
/// Returns [`KeyDerivationError::EmptyIdentifier`] for an empty identifier.
pub fn derive_auth_key(identifier: &str) -> Result<AuthKey, KeyDerivationError> {
    StaticSecret::default().derive_key(identifier)
}
