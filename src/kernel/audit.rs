//! Hash-only audit archive for pipeline stages.
//!
//! Every event is salted and hashed before it reaches the sink, so the
//! archive holds fixed-length digests only and cannot be read back as
//! plaintext. The sink is append-only and safe to share across threads.

use std::sync::{Arc, Mutex, PoisonError};

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random salt bytes drawn per [`Auditor`].
const SALT_LEN: usize = 16;

/// A single audit record: SHA-256 over `salt || event`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuditDigest([u8; 32]);

impl AuditDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for AuditDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuditDigest({})", self.to_hex())
    }
}

impl std::fmt::Display for AuditDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Append-only destination for audit digests.
///
/// Implementations must accept concurrent calls. There is no read API:
/// the kernel only ever writes.
pub trait AuditSink: Send + Sync {
    /// Append one digest.
    fn record(&self, digest: AuditDigest);
}

/// In-memory audit archive.
///
/// Appends from concurrent writers land in some valid interleaving; each
/// writer's own records stay in the order it wrote them.
#[derive(Debug, Default)]
pub struct AuditArchive {
    records: Mutex<Vec<AuditDigest>>,
}

impl AuditArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the stored digests, oldest first, for operator inspection.
    pub fn snapshot(&self) -> Vec<AuditDigest> {
        self.lock().clone()
    }

    // Records are only ever pushed, so a writer that panicked mid-append
    // cannot leave earlier entries inconsistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditDigest>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for AuditArchive {
    fn record(&self, digest: AuditDigest) {
        self.lock().push(digest);
    }
}

/// Salting front-end over an [`AuditSink`].
///
/// Turns event descriptions into digests under a salt drawn once at
/// construction. The plaintext never leaves this type.
#[derive(Clone)]
pub struct Auditor {
    sink: Arc<dyn AuditSink>,
    salt: [u8; SALT_LEN],
}

impl Auditor {
    /// Create an auditor with a fresh random salt.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(sink, salt)
    }

    /// Create an auditor with a fixed salt (for testing).
    pub fn with_salt(sink: Arc<dyn AuditSink>, salt: [u8; SALT_LEN]) -> Self {
        Self { sink, salt }
    }

    /// Hash an event under this auditor's salt without recording it.
    pub fn digest(&self, event: &str) -> AuditDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.salt);
        hasher.update(event.as_bytes());
        AuditDigest(hasher.finalize().into())
    }

    /// Hash and record an event.
    pub fn store(&self, event: &str) {
        self.sink.record(self.digest(event));
    }
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("salt", &"__REDACTED__")
            .finish_non_exhaustive()
    }
}
