//! Full-cycle pipeline: the core execution model.
//!
//! Orchestrates six stages for an authenticated caller:
//! - Lens: contextual modulation of the input
//! - Forward: discrete Fourier transform
//! - Filter: percentile magnitude threshold
//! - Inverse: back to the signal domain
//! - Stabilize: bounded K-Operator per element
//! - Seal: one-way commitment over the canonical output string
//!
//! Every internal failure is converted into a sentinel seal at this
//! boundary; [`GenesisKernel::execute_full_cycle`] never returns an error.

use std::fmt::Write as _;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::{KernelConfig, MAX_INPUT_LEN};
use crate::kernel::audit::{AuditSink, Auditor};
use crate::kernel::gate::{AuthorizationError, AuthorizedIdentity};
use crate::kernel::seal::{seal, Seal};
use crate::kernel::vault::{SecretProvider, StaticSecret};
use crate::math::lens::ContextLens;
use crate::math::sanitize::{sanitize_context, sanitize_data, Coercible, CONTEXT_DEFAULT, DATA_DEFAULT};
use crate::math::spectral::{self, HarmonicFilter, SpectralError};
use crate::math::stabilizer::{KOperator, StabilizerError};

/// Approximate characters per formatted value in the canonical string.
const CHARS_PER_VALUE: usize = 12;

/// Internal cycle faults. Always caught inside the kernel.
#[derive(Debug, Error)]
pub enum CycleError {
    /// A transform produced NaN or infinity.
    #[error("numeric instability: {0}")]
    NumericInstability(#[from] SpectralError),
    /// The stabilizer's footprint guard tripped.
    #[error("resource limit: {0}")]
    ResourceLimit(#[from] StabilizerError),
    /// Any other fault, including panics inside a stage.
    #[error("internal fault: {0}")]
    Internal(String),
}

/// Kernel lifecycle states.
///
/// `Unauthenticated` is the absence of a kernel: construction either
/// yields an `Idle` kernel or fails. `Idle` is re-entrant; each cycle
/// ends in one of the three terminal states and the kernel returns to
/// `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No verified caller yet.
    Unauthenticated,
    /// Authenticated and waiting for a cycle.
    Idle,
    /// Stages are executing.
    Running,
    /// The cycle produced a genuine seal.
    Completed,
    /// The input exceeded the size cap; the cycle never ran.
    LimitExceeded,
    /// The cycle failed; the error sentinel was returned.
    ErrorState,
}

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Genuine seal or one of the sentinels.
    pub seal: Seal,
    /// Terminal state the cycle reached.
    pub state: CycleState,
    /// Number of samples that went through the pipeline.
    pub samples: usize,
}

/// Authenticated execution core.
///
/// Holds only the verified identity, its configuration and a handle on
/// the shared audit sink. Cycles run sequentially per call and share no
/// numeric state, so one kernel may be used from several threads.
#[derive(Debug)]
pub struct GenesisKernel {
    identity: AuthorizedIdentity,
    config: KernelConfig,
    filter: HarmonicFilter,
    stabilizer: KOperator,
    audit: Auditor,
}

impl GenesisKernel {
    /// Authenticate `identifier` against the default secret and build a
    /// kernel with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError`] if `key` was not derived for
    /// `identifier`.
    pub fn new(
        identifier: &str,
        key: &[u8],
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, AuthorizationError> {
        Self::with_provider(
            identifier,
            key,
            &StaticSecret::default(),
            audit,
            KernelConfig::default(),
        )
    }

    /// Authenticate against a custom secret provider and configuration.
    ///
    /// Run [`KernelConfig::validate`] first when the configuration comes
    /// from outside. An input limit above [`MAX_INPUT_LEN`] (or zero) is
    /// clamped here regardless.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError`] if `key` was not derived for
    /// `identifier` by `provider`.
    pub fn with_provider(
        identifier: &str,
        key: &[u8],
        provider: &dyn SecretProvider,
        audit: Arc<dyn AuditSink>,
        mut config: KernelConfig,
    ) -> Result<Self, AuthorizationError> {
        let identity = AuthorizedIdentity::verify(identifier, key, provider)?;
        let requested = config.pipeline.max_input_len;
        config.pipeline.max_input_len = requested.clamp(1, MAX_INPUT_LEN);
        if config.pipeline.max_input_len != requested {
            warn!(
                requested,
                applied = config.pipeline.max_input_len,
                "input limit out of range, clamped"
            );
        }
        info!(identifier = identity.identifier(), "kernel authenticated");
        Ok(Self {
            identity,
            filter: HarmonicFilter::new(config.pipeline.filter_percentile),
            stabilizer: KOperator::from_config(&config.stabilizer),
            config,
            audit: Auditor::new(audit),
        })
    }

    /// The verified caller identifier.
    pub fn identifier(&self) -> &str {
        self.identity.identifier()
    }

    /// Active configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Run one cycle and return its seal. Never fails.
    ///
    /// The result is a genuine seal, [`Seal::LIMIT_EXCEEDED`] or
    /// [`Seal::ERROR_STATE`]; compare with the sentinels to tell them apart.
    pub fn execute_full_cycle<D: Coercible, C: Coercible>(&self, data: &[D], context: &[C]) -> Seal {
        self.run_cycle(data, context).seal
    }

    /// Run one cycle and report its terminal state alongside the seal.
    pub fn run_cycle<D: Coercible, C: Coercible>(&self, data: &[D], context: &[C]) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", %cycle_id, identifier = self.identity.identifier());
        let _entered = span.enter();

        // Coercion runs caller-supplied `Coercible` impls.
        let aligned = catch_unwind(AssertUnwindSafe(|| align_inputs(data, context)));
        let (data, context) = match aligned {
            Ok(aligned) => aligned,
            Err(payload) => return self.fail(&CycleError::Internal(panic_message(&*payload))),
        };

        let limit = self.config.pipeline.max_input_len;
        if data.len() > limit {
            warn!(len = data.len(), limit, "input too large, rejecting");
            self.audit.store(&format!(
                "Input rejected: length {} exceeds limit {limit}.",
                data.len()
            ));
            return CycleReport {
                seal: Seal::LIMIT_EXCEEDED,
                state: CycleState::LimitExceeded,
                samples: 0,
            };
        }

        let samples = data.len();
        debug!(state = ?CycleState::Running, samples, "cycle running");
        let staged = catch_unwind(AssertUnwindSafe(|| self.run_stages(&data, &context)))
            .unwrap_or_else(|payload| Err(CycleError::Internal(panic_message(&*payload))));

        match staged {
            Ok(seal) => {
                self.audit.store(&format!("Cycle complete. Seal: {seal}"));
                info!(samples, "cycle complete");
                CycleReport {
                    seal,
                    state: CycleState::Completed,
                    samples,
                }
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Record a failed cycle and hand back the error sentinel.
    fn fail(&self, error: &CycleError) -> CycleReport {
        self.audit.store(&format!("Cycle error: {error}"));
        warn!(error = %error, "cycle failed");
        CycleReport {
            seal: Seal::ERROR_STATE,
            state: CycleState::ErrorState,
            samples: 0,
        }
    }

    /// Lens -> forward -> filter -> inverse -> stabilize -> seal.
    fn run_stages(&self, data: &[f64], context: &[f64]) -> Result<Seal, CycleError> {
        let lens = ContextLens::new(context);
        let contextualized = lens.apply(data);
        self.audit.store(&format!(
            "Applied context lens with {} weights.",
            lens.context().len()
        ));
        debug!(stage = "lens", weights = lens.context().len());

        let spectrum = spectral::forward(&contextualized);
        let filtered = self.filter.apply(&spectrum)?;
        let harmonic = spectral::inverse(&filtered);
        spectral::ensure_finite(&harmonic, "inverse transform")?;
        self.audit.store("Applied harmonic filter.");
        debug!(stage = "filter", samples = harmonic.len());

        let mut canonical = String::with_capacity(harmonic.len().saturating_mul(CHARS_PER_VALUE));
        for outcome in self.stabilizer.recurse_all(&harmonic)? {
            if self.stabilizer.reached_depth_bound(&outcome) {
                self.audit.store("Reached max recursion depth.");
            }
            write!(canonical, "{:.6}", outcome.value)
                .map_err(|e| CycleError::Internal(e.to_string()))?;
        }
        self.audit.store("Applied K-Operator recursion.");
        debug!(stage = "stabilize", depth = self.stabilizer.max_depth());

        Ok(seal(&canonical))
    }
}

/// Coerce both inputs and bring them to a shared length.
///
/// Differing lengths truncate to the shorter. A shared length of zero
/// keeps at most the first element of each side, padding an empty side
/// with its neutral default.
fn align_inputs<D: Coercible, C: Coercible>(data: &[D], context: &[C]) -> (Vec<f64>, Vec<f64>) {
    let mut data = sanitize_data(data);
    let mut context = sanitize_context(context);

    let shared = data.len().min(context.len());
    if shared == 0 {
        data.truncate(1);
        context.truncate(1);
        if data.is_empty() {
            data.push(DATA_DEFAULT);
        }
        if context.is_empty() {
            context.push(CONTEXT_DEFAULT);
        }
    } else {
        data.truncate(shared);
        context.truncate(shared);
    }
    (data, context)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("stage panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("stage panicked: {s}")
    } else {
        "stage panicked".to_owned()
    }
}
