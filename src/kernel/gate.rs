//! Authentication gate: the only way to obtain an [`AuthorizedIdentity`].
//!
//! The caller presents an identifier and a candidate key. The gate asks
//! the [`SecretProvider`] for the expected key and compares the two in
//! constant time. Nothing about the expected key reaches logs or errors.

use thiserror::Error;
use tracing::warn;

use crate::kernel::vault::{KeyDerivationError, SecretProvider};

/// Authorization failures. Fatal: no kernel is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The presented key does not match the key derived for the identifier.
    #[error("invalid authentication key for identifier {identifier:?}")]
    InvalidKey {
        /// Identifier that failed verification.
        identifier: String,
    },
    /// Identifiers must contain at least one character.
    #[error("identifier must be a non-empty string")]
    EmptyIdentifier,
    /// The secret provider could not derive a key.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl From<KeyDerivationError> for AuthorizationError {
    fn from(err: KeyDerivationError) -> Self {
        match err {
            KeyDerivationError::EmptyIdentifier => Self::EmptyIdentifier,
            other => Self::Derivation(other.to_string()),
        }
    }
}

/// A caller identifier whose key has been verified.
///
/// Can only be built through [`AuthorizedIdentity::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedIdentity {
    identifier: String,
}

impl AuthorizedIdentity {
    /// Verify `candidate_key` against the key `provider` derives for
    /// `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidKey`] on mismatch, or
    /// [`AuthorizationError::EmptyIdentifier`] for an empty identifier.
    pub fn verify(
        identifier: &str,
        candidate_key: &[u8],
        provider: &dyn SecretProvider,
    ) -> Result<Self, AuthorizationError> {
        let expected = provider.derive_key(identifier)?;
        if !expected.ct_matches(candidate_key) {
            warn!(identifier, "authentication rejected");
            return Err(AuthorizationError::InvalidKey {
                identifier: identifier.to_owned(),
            });
        }
        Ok(Self {
            identifier: identifier.to_owned(),
        })
    }

    /// The verified identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}
