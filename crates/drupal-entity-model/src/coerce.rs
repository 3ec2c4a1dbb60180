//! Wire field coercion rules.
//!
//! The upstream API is loose about numeric and boolean representations:
//! integers arrive as strings, booleans arrive as `"1"`/`0`/`true`, and
//! boolean fields must be serialized as true-or-absent because the server
//! rejects explicit `false`/`0`. The functions here canonicalize values on
//! the way in and re-apply the constraints on the way out.

use crate::error::{ModelError, ModelResult};
use serde_json::Value;

/// How malformed numeric/boolean input is handled on the input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// Malformed input degrades silently to `0`/`false` (upstream behavior)
    #[default]
    Lenient,
    /// Malformed input surfaces a [`ModelError::Coercion`]
    Strict,
}

/// Coerce a wire value to a canonical integer.
///
/// Booleans map to `{0, 1}`; numeric strings are parsed; anything
/// non-numeric degrades to `0`. Idempotent.
pub fn coerce_integer(value: &Value) -> i64 {
    parse_integer(value).unwrap_or(0)
}

/// Strict variant of [`coerce_integer`]: non-numeric input is an error.
pub fn try_coerce_integer(field: &str, value: &Value) -> ModelResult<i64> {
    parse_integer(value).ok_or_else(|| ModelError::Coercion {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a wire value to a canonical boolean (input path).
///
/// Booleans pass through; everything else is integer-coerced and compared
/// against zero, so `"1"` and `1` are true while `"abc"` degrades to false.
pub fn coerce_bool_input(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        _ => coerce_integer(value) > 0,
    }
}

/// Strict variant of [`coerce_bool_input`].
pub fn try_coerce_bool_input(field: &str, value: &Value) -> ModelResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        _ => Ok(try_coerce_integer(field, value)? > 0),
    }
}

/// Coerce a canonical boolean for serialization (output path).
///
/// The upstream API rejects explicit `false`/`0` on boolean fields, so the
/// output side can only express true-or-absent: `Some(true)` means emit
/// `true`, `None` means omit the field entirely. This asymmetry with the
/// input path is an upstream constraint and is preserved exactly.
pub fn coerce_bool_output(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(true) => Some(true),
        Value::Number(n) => {
            let positive = n.as_i64().map(|i| i > 0).or_else(|| n.as_f64().map(|f| f > 0.0));
            match positive {
                Some(true) => Some(true),
                _ => None,
            }
        }
        Value::String(s) if s == "1" || s == "true" => Some(true),
        _ => None,
    }
}

impl CoercionMode {
    /// Apply the integer rule under this mode.
    pub fn integer(self, field: &str, value: &Value) -> ModelResult<i64> {
        match self {
            CoercionMode::Lenient => Ok(coerce_integer(value)),
            CoercionMode::Strict => try_coerce_integer(field, value),
        }
    }

    /// Apply the boolean input rule under this mode.
    pub fn boolean(self, field: &str, value: &Value) -> ModelResult<bool> {
        match self {
            CoercionMode::Lenient => Ok(coerce_bool_input(value)),
            CoercionMode::Strict => try_coerce_bool_input(field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer_fixed_points() {
        assert_eq!(coerce_integer(&json!(true)), 1);
        assert_eq!(coerce_integer(&json!(false)), 0);
        assert_eq!(coerce_integer(&json!("abc")), 0);
        assert_eq!(coerce_integer(&json!("42")), 42);
        assert_eq!(coerce_integer(&json!(42)), 42);
        assert_eq!(coerce_integer(&json!(null)), 0);
    }

    #[test]
    fn test_coerce_integer_idempotent() {
        for value in [json!(true), json!("42"), json!("abc"), json!(7.9), json!(null)] {
            let once = coerce_integer(&value);
            let twice = coerce_integer(&json!(once));
            assert_eq!(once, twice, "input {value}");
        }
    }

    #[test]
    fn test_coerce_integer_trims_whitespace() {
        assert_eq!(coerce_integer(&json!(" 17 ")), 17);
    }

    #[test]
    fn test_coerce_bool_input() {
        assert!(!coerce_bool_input(&json!(0)));
        assert!(coerce_bool_input(&json!(1)));
        assert!(!coerce_bool_input(&json!("abc")));
        assert!(coerce_bool_input(&json!(true)));
        assert!(!coerce_bool_input(&json!(false)));
        assert!(coerce_bool_input(&json!("2")));
        assert!(!coerce_bool_input(&json!("-1")));
    }

    #[test]
    fn test_coerce_bool_output_true_cases() {
        assert_eq!(coerce_bool_output(&json!(1)), Some(true));
        assert_eq!(coerce_bool_output(&json!(7)), Some(true));
        assert_eq!(coerce_bool_output(&json!(true)), Some(true));
        assert_eq!(coerce_bool_output(&json!("1")), Some(true));
        assert_eq!(coerce_bool_output(&json!("true")), Some(true));
    }

    #[test]
    fn test_coerce_bool_output_absent_cases() {
        assert_eq!(coerce_bool_output(&json!(false)), None);
        assert_eq!(coerce_bool_output(&json!(0)), None);
        assert_eq!(coerce_bool_output(&json!("0")), None);
        assert_eq!(coerce_bool_output(&json!(null)), None);
        assert_eq!(coerce_bool_output(&json!(-3)), None);
        assert_eq!(coerce_bool_output(&json!("yes")), None);
    }

    #[test]
    fn test_strict_integer_rejects_malformed() {
        let err = try_coerce_integer("uid", &json!("abc")).unwrap_err();
        assert!(matches!(err, ModelError::Coercion { .. }));
        assert_eq!(try_coerce_integer("uid", &json!("5")).unwrap(), 5);
        assert_eq!(try_coerce_integer("uid", &json!(true)).unwrap(), 1);
    }

    #[test]
    fn test_strict_bool_rejects_malformed() {
        assert!(try_coerce_bool_input("status", &json!("abc")).is_err());
        assert!(try_coerce_bool_input("status", &json!(true)).unwrap());
        assert!(!try_coerce_bool_input("status", &json!("0")).unwrap());
    }

    #[test]
    fn test_mode_dispatch() {
        assert_eq!(CoercionMode::Lenient.integer("uid", &json!("abc")).unwrap(), 0);
        assert!(CoercionMode::Strict.integer("uid", &json!("abc")).is_err());
        assert!(!CoercionMode::Lenient.boolean("status", &json!("abc")).unwrap());
        assert!(CoercionMode::Strict.boolean("status", &json!("abc")).is_err());
    }
}
