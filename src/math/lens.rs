//! Context lens: element-wise modulation by a cyclic context vector.

use crate::math::sanitize::{sanitize_context, sanitize_data, Coercible, CONTEXT_DEFAULT, DATA_DEFAULT};

/// Scales data by a context vector repeated cyclically.
///
/// `result[i] = data[i] * context[i mod len(context)]`. The context is
/// sanitized once at construction and is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextLens {
    context: Vec<f64>,
}

impl ContextLens {
    /// Build a lens from raw context values.
    ///
    /// Non-finite or non-numeric entries become `1.0`; an empty context
    /// becomes `[1.0]`.
    pub fn new<T: Coercible>(context: &[T]) -> Self {
        let mut context = sanitize_context(context);
        if context.is_empty() {
            context.push(CONTEXT_DEFAULT);
        }
        Self { context }
    }

    /// The sanitized context in use.
    pub fn context(&self) -> &[f64] {
        &self.context
    }

    /// Apply the lens. Never fails.
    ///
    /// Non-finite or non-numeric data entries become `0.0`. Empty data
    /// yields `[0.0]` so later stages always see at least one sample.
    pub fn apply<T: Coercible>(&self, data: &[T]) -> Vec<f64> {
        let data = sanitize_data(data);
        if data.is_empty() {
            return vec![DATA_DEFAULT];
        }
        data.iter()
            .zip(self.context.iter().cycle())
            .map(|(datum, weight)| datum * weight)
            .collect()
    }
}
