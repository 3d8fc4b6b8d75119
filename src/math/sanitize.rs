//! Coercion of loosely-typed input into finite floats.
//!
//! Upstream collaborators hand over whatever they parsed: numbers,
//! numeric strings, JSON values. Anything that does not coerce to a
//! finite `f64` is replaced by a neutral default and never reaches the
//! pipeline as NaN or infinity.

/// Default for data elements that fail coercion.
pub const DATA_DEFAULT: f64 = 0.0;

/// Default for context elements that fail coercion.
pub const CONTEXT_DEFAULT: f64 = 1.0;

/// A value that may be converted to `f64`.
///
/// Returns `None` when no numeric reading exists. The result may still be
/// non-finite (`"inf"` parses); callers filter that separately.
pub trait Coercible {
    /// Attempt a numeric reading of `self`.
    fn coerce(&self) -> Option<f64>;
}

impl Coercible for f64 {
    fn coerce(&self) -> Option<f64> {
        Some(*self)
    }
}

impl Coercible for f32 {
    fn coerce(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl Coercible for i32 {
    fn coerce(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl Coercible for u32 {
    fn coerce(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl Coercible for u8 {
    fn coerce(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl Coercible for i64 {
    #[allow(clippy::cast_precision_loss)] // nearest float is the intended reading
    fn coerce(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl Coercible for bool {
    fn coerce(&self) -> Option<f64> {
        Some(if *self { 1.0 } else { 0.0 })
    }
}

impl Coercible for str {
    fn coerce(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok()
    }
}

impl Coercible for String {
    fn coerce(&self) -> Option<f64> {
        self.as_str().coerce()
    }
}

impl<T: Coercible> Coercible for Option<T> {
    fn coerce(&self) -> Option<f64> {
        self.as_ref().and_then(Coercible::coerce)
    }
}

impl<T: Coercible + ?Sized> Coercible for &T {
    fn coerce(&self) -> Option<f64> {
        (**self).coerce()
    }
}

impl Coercible for serde_json::Value {
    fn coerce(&self) -> Option<f64> {
        match self {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.coerce(),
            serde_json::Value::Bool(b) => b.coerce(),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

/// Coerce one value, substituting `default` for failures and non-finite
/// readings.
pub fn finite_or<T: Coercible + ?Sized>(value: &T, default: f64) -> f64 {
    match value.coerce() {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Coerce a data vector element-wise; failures become `0.0`.
pub fn sanitize_data<T: Coercible>(values: &[T]) -> Vec<f64> {
    values.iter().map(|v| finite_or(v, DATA_DEFAULT)).collect()
}

/// Coerce a context vector element-wise; failures become `1.0`.
///
/// Length is preserved, so an empty input stays empty.
pub fn sanitize_context<T: Coercible>(values: &[T]) -> Vec<f64> {
    values.iter().map(|v| finite_or(v, CONTEXT_DEFAULT)).collect()
}
