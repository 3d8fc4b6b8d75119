//! Genesis kernel: an authenticated, deterministic numeric pipeline.
//!
//! A caller proves it holds the key derived for its identifier, then feeds
//! bounded numeric input through a fixed pipeline: context modulation,
//! discrete Fourier round-trip with percentile filtering, bounded
//! stabilization, and a one-way seal over the result. Every stage leaves a
//! salted, hash-only record in an append-only audit sink.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub mod kernel;
pub mod math;

pub use kernel::audit::{AuditArchive, AuditDigest, AuditSink};
pub use kernel::gate::{AuthorizationError, AuthorizedIdentity};
pub use kernel::pipeline::{CycleError, CycleReport, CycleState, GenesisKernel};
pub use kernel::seal::{seal, Seal, SealStatus, ERROR_SEAL, LIMIT_SEAL};
pub use kernel::vault::{derive_auth_key, AuthKey, KeyDerivationError, SecretProvider, StaticSecret};
