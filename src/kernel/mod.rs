//! Kernel core: the trusted part of the pipeline.
//!
//! Authentication, audit recording, sealing and cycle orchestration all
//! happen here. The numeric stages live in [`crate::math`] and know nothing
//! about callers or audit sinks.

pub mod audit;
pub mod gate;
pub mod pipeline;
pub mod seal;
pub mod vault;
