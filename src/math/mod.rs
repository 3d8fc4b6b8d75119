//! Numeric stages of the pipeline.
//!
//! Pure functions over `f64` slices: no audit sinks, no callers, no I/O.
//! The kernel drives them in a fixed order and records what happened.

pub mod lens;
pub mod sanitize;
pub mod spectral;
pub mod stabilizer;
