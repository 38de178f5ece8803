//! Numeric guards for upstream fundamentals.
//!
//! Every model input passes through these guards before use. A field is
//! usable only if it is present and finite; anything else is treated as
//! "unavailable for the models that need it", never as a hard error.

use serde_json::Value;

/// Whether a fundamental field is usable as a model input.
pub fn is_usable(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite())
}

/// The field itself when usable, `None` otherwise.
///
/// NaN and infinities are filtered out alongside absent values, so model
/// code can rely on any `Some` being finite.
pub fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Coerce a loosely-typed upstream value into a finite float.
///
/// Fetch adapters use this to translate quote-summary payload fields —
/// JSON numbers, numeric strings, `"N/A"` placeholders, nulls — into the
/// typed `Option<f64>` the snapshot carries. Never panics.
pub fn from_loose(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_usable() {
        assert!(is_usable(Some(1.5)));
        assert!(is_usable(Some(0.0)));
        assert!(is_usable(Some(-3.2)));
        assert!(!is_usable(None));
        assert!(!is_usable(Some(f64::NAN)));
        assert!(!is_usable(Some(f64::INFINITY)));
        assert!(!is_usable(Some(f64::NEG_INFINITY)));
    }

    #[test]
    fn test_usable_filters_non_finite() {
        assert_eq!(usable(Some(2.0)), Some(2.0));
        assert_eq!(usable(Some(f64::NAN)), None);
        assert_eq!(usable(None), None);
    }

    #[test]
    fn test_from_loose_numbers_and_strings() {
        assert_eq!(from_loose(&json!(0.08)), Some(0.08));
        assert_eq!(from_loose(&json!(42)), Some(42.0));
        assert_eq!(from_loose(&json!("12.5")), Some(12.5));
        assert_eq!(from_loose(&json!(" 7 ")), Some(7.0));
    }

    #[test]
    fn test_from_loose_rejects_unparseable() {
        assert_eq!(from_loose(&json!("N/A")), None);
        assert_eq!(from_loose(&json!("")), None);
        assert_eq!(from_loose(&json!(null)), None);
        assert_eq!(from_loose(&json!({"raw": 1.0})), None);
        assert_eq!(from_loose(&json!("inf")), None);
    }
}
