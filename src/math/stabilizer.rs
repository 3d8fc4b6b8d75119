//! K-Operator: bounded damped fixed-point iteration.
//!
//! Each step averages the value with its (offset) reciprocal,
//! `v <- (v + 1/(v + 0.001)) / 2`, which pulls any positive seed towards
//! roughly 1. The iteration count is fixed, so cost per element is
//! constant regardless of input.

use thiserror::Error;

use crate::config::StabilizerConfig;

/// Offset added to the value before taking its reciprocal.
const DENOMINATOR_OFFSET: f64 = 0.001;

/// Below this magnitude a denominator counts as zero.
const ZERO_TOLERANCE: f64 = 1e-12;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Exact number of iterations applied to every value.
pub const STABILIZER_DEPTH: u32 = 7;

/// Stabilizer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StabilizerError {
    /// The value's in-memory footprint exceeds the configured ceiling.
    #[error("memory footprint of {footprint_bytes} bytes exceeds {ceiling_mb} MB limit")]
    ResourceLimit {
        /// Approximate footprint of the value being processed.
        footprint_bytes: usize,
        /// Configured ceiling in megabytes.
        ceiling_mb: u64,
    },
}

/// Result of stabilizing one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stabilized {
    /// Final value, finite and non-negative.
    pub value: f64,
    /// Iterations performed.
    pub depth: u32,
}

/// Bounded fixed-point stabilizer.
#[derive(Debug, Clone, PartialEq)]
pub struct KOperator {
    seed_floor: f64,
    max_memory_mb: u64,
}

impl Default for KOperator {
    fn default() -> Self {
        Self::from_config(&StabilizerConfig::default())
    }
}

impl KOperator {
    /// Build an operator from configuration.
    pub fn from_config(config: &StabilizerConfig) -> Self {
        Self {
            seed_floor: config.seed_floor,
            max_memory_mb: config.max_memory_mb,
        }
    }

    /// Iteration bound, always [`STABILIZER_DEPTH`].
    pub fn max_depth(&self) -> u32 {
        STABILIZER_DEPTH
    }

    /// Reject footprints above the memory ceiling.
    ///
    /// Scalars never come close; the check guards any larger
    /// representation routed through the operator.
    ///
    /// # Errors
    ///
    /// Returns [`StabilizerError::ResourceLimit`] when `footprint_bytes`
    /// exceeds the ceiling.
    pub fn check_footprint(&self, footprint_bytes: usize) -> Result<(), StabilizerError> {
        let ceiling = usize::try_from(self.max_memory_mb)
            .unwrap_or(usize::MAX)
            .saturating_mul(BYTES_PER_MB);
        if footprint_bytes > ceiling {
            return Err(StabilizerError::ResourceLimit {
                footprint_bytes,
                ceiling_mb: self.max_memory_mb,
            });
        }
        Ok(())
    }

    /// Stabilize one value.
    ///
    /// Non-finite seeds become the seed floor; seeds below the floor are
    /// raised to it. Exactly [`STABILIZER_DEPTH`] iterations run.
    ///
    /// # Errors
    ///
    /// Returns [`StabilizerError::ResourceLimit`] if the footprint guard trips.
    pub fn recurse(&self, value: f64) -> Result<Stabilized, StabilizerError> {
        self.check_footprint(std::mem::size_of_val(&value))?;

        let mut result = if value.is_finite() {
            value.max(self.seed_floor)
        } else {
            self.seed_floor
        };

        let mut depth = 0u32;
        while depth < STABILIZER_DEPTH {
            let mut denominator = result + DENOMINATOR_OFFSET;
            if denominator.abs() < ZERO_TOLERANCE {
                denominator = DENOMINATOR_OFFSET;
            }
            result = ((result + 1.0 / denominator) / 2.0).max(0.0);
            depth = depth.saturating_add(1);
        }

        Ok(Stabilized {
            value: result,
            depth,
        })
    }

    /// Stabilize every value in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`StabilizerError`] raised by [`Self::recurse`].
    pub fn recurse_all(&self, values: &[f64]) -> Result<Vec<Stabilized>, StabilizerError> {
        values.iter().map(|&v| self.recurse(v)).collect()
    }

    /// Whether `outcome` ran into the depth bound.
    pub fn reached_depth_bound(&self, outcome: &Stabilized) -> bool {
        outcome.depth >= STABILIZER_DEPTH
    }
}
