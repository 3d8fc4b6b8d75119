//! Discrete Fourier round-trip and percentile magnitude filter.
//!
//! Direct O(N²) evaluation of
//!
//! ```text
//! X[k] = Σ_n x[n] · e^{-2πi·k·n/N}
//! x[n] = (1/N) · Σ_k X[k] · e^{ 2πi·k·n/N}   (real part)
//! ```
//!
//! Twiddle factors come from a table of the N roots of unity indexed by
//! `(k·n) mod N`, and every sum runs in ascending index order, so output is
//! bit-for-bit reproducible for a given input.

use std::f64::consts::TAU;
use std::ops::{Add, Mul};

use thiserror::Error;

/// Default percentile used for the magnitude threshold.
pub const DEFAULT_FILTER_PERCENTILE: f64 = 90.0;

/// Spectral stage errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpectralError {
    /// A transform produced NaN or infinity.
    #[error("non-finite value produced by {stage}")]
    NonFinite {
        /// Stage that produced the value.
        stage: &'static str,
    },
}

/// One complex frequency-domain sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectralSample {
    /// Real component.
    pub re: f64,
    /// Imaginary component.
    pub im: f64,
}

impl SpectralSample {
    /// Complex zero.
    pub const ZERO: SpectralSample = SpectralSample { re: 0.0, im: 0.0 };

    /// Build a sample from its components.
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Euclidean norm of `(re, im)`.
    pub fn magnitude(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Whether both components are finite.
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }
}

impl Add for SpectralSample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Mul for SpectralSample {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// `e^{sign·2πi·j/n}` for `j` in `0..n`.
fn roots_of_unity(n: usize, sign: f64) -> Vec<SpectralSample> {
    #[allow(clippy::cast_precision_loss)] // lengths are capped far below 2^52
    let len = n as f64;
    (0..n)
        .map(|j| {
            #[allow(clippy::cast_precision_loss)]
            let angle = sign * TAU * (j as f64) / len;
            SpectralSample::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// Next twiddle index: `(index + step) mod n` for `index, step < n`.
#[allow(clippy::arithmetic_side_effects)] // both operands are below n, the sum below 2n
fn advance(index: usize, step: usize, n: usize) -> usize {
    let next = index + step;
    if next >= n {
        next - n
    } else {
        next
    }
}

/// Shared O(N²) kernel: `out[k] = Σ_j input[j] · roots[(k·j) mod N]`.
fn correlate(input: &[SpectralSample], roots: &[SpectralSample]) -> Vec<SpectralSample> {
    let n = input.len();
    (0..n)
        .map(|k| {
            let mut index = 0;
            let mut total = SpectralSample::ZERO;
            for &value in input {
                total = total + value * roots[index];
                index = advance(index, k, n);
            }
            total
        })
        .collect()
}

/// Forward DFT of a real signal. Empty input yields an empty spectrum.
pub fn forward(signal: &[f64]) -> Vec<SpectralSample> {
    if signal.is_empty() {
        return Vec::new();
    }
    let input: Vec<SpectralSample> = signal.iter().map(|&x| SpectralSample::new(x, 0.0)).collect();
    correlate(&input, &roots_of_unity(signal.len(), -1.0))
}

/// Inverse DFT, keeping the real part. Empty input yields an empty signal.
pub fn inverse(spectrum: &[SpectralSample]) -> Vec<f64> {
    if spectrum.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)] // lengths are capped far below 2^52
    let norm = 1.0 / spectrum.len() as f64;
    correlate(spectrum, &roots_of_unity(spectrum.len(), 1.0))
        .into_iter()
        .map(|total| total.scale(norm).re)
        .collect()
}

/// Percentile with linear interpolation between order statistics.
///
/// `p` is clamped to `[0, 100]`; the rank position is `(p/100)·(N-1)`.
/// Empty input yields `0.0`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.0;
    };

    let p = p.clamp(0.0, 100.0);
    #[allow(clippy::cast_precision_loss)]
    let position = (p / 100.0) * last as f64;

    // position lies in [0, last], so both ranks are valid indices.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lower, upper) = (position.floor() as usize, position.ceil() as usize);
    let lower_value = sorted[lower.min(last)];
    let upper_value = sorted[upper.min(last)];
    if lower == upper {
        return lower_value;
    }
    #[allow(clippy::cast_precision_loss)]
    let weight = position - lower as f64;
    lower_value + (upper_value - lower_value) * weight
}

/// Fail with [`SpectralError::NonFinite`] if any value is NaN or infinite.
///
/// # Errors
///
/// Returns an error naming `stage` on the first non-finite value.
pub fn ensure_finite(values: &[f64], stage: &'static str) -> Result<(), SpectralError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SpectralError::NonFinite { stage })
    }
}

/// Zeroes spectral samples whose magnitude falls below a percentile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicFilter {
    percentile: f64,
}

impl Default for HarmonicFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_PERCENTILE)
    }
}

impl HarmonicFilter {
    /// Create a filter at the given percentile (clamped to `[0, 100]`).
    pub fn new(percentile: f64) -> Self {
        Self {
            percentile: percentile.clamp(0.0, 100.0),
        }
    }

    /// Magnitude threshold for a spectrum.
    pub fn threshold(&self, spectrum: &[SpectralSample]) -> f64 {
        let magnitudes: Vec<f64> = spectrum.iter().map(|s| s.magnitude()).collect();
        percentile(&magnitudes, self.percentile)
    }

    /// Zero every sample strictly below the threshold; keep the rest.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::NonFinite`] if any sample or magnitude is
    /// not finite.
    pub fn apply(&self, spectrum: &[SpectralSample]) -> Result<Vec<SpectralSample>, SpectralError> {
        let finite = spectrum
            .iter()
            .all(|s| s.is_finite() && s.magnitude().is_finite());
        if !finite {
            return Err(SpectralError::NonFinite {
                stage: "forward transform",
            });
        }

        let threshold = self.threshold(spectrum);
        Ok(spectrum
            .iter()
            .map(|&s| {
                if s.magnitude() >= threshold {
                    s
                } else {
                    SpectralSample::ZERO
                }
            })
            .collect())
    }
}
