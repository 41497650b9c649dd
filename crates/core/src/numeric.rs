//! Lenient numeric decoding for counter rows and revenue splits.
//!
//! Counter rows come from stores that do not enforce types: fields may be
//! missing, `null`, numeric strings or garbage. Every decoder here maps the
//! unusable cases to zero so downstream arithmetic never sees NaN.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Split applied when a user has no usable split on record.
pub const DEFAULT_SPLIT_PERCENT: f64 = 100.0;

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Decode a monetary amount. Numbers, numeric strings and booleans are
/// accepted; everything else is zero.
pub fn coerce_amount(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    finite_or_zero(n)
}

/// Decode a non-negative integer count. Fractions truncate, negatives are zero.
pub fn coerce_count(value: &Value) -> u64 {
    let n = coerce_amount(value);
    if n <= 0.0 {
        0
    } else {
        n.trunc() as u64
    }
}

/// Clamp a split percentage into `[0, 100]`. NaN falls back to the default.
pub fn clamp_split_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        DEFAULT_SPLIT_PERCENT
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// A recorded split that is usable as-is: finite and within `[0, 100]`.
/// Anything else falls back to [`DEFAULT_SPLIT_PERCENT`].
pub fn normalize_split_percent(percent: f64) -> f64 {
    if percent.is_finite() && (0.0..=100.0).contains(&percent) {
        percent
    } else {
        DEFAULT_SPLIT_PERCENT
    }
}

/// Decode a split percentage from a registration record field.
///
/// Absent, non-numeric and out-of-range values all yield
/// [`DEFAULT_SPLIT_PERCENT`].
pub fn split_percent_from_value(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .map(normalize_split_percent)
        .unwrap_or(DEFAULT_SPLIT_PERCENT)
}

/// Relative distance from a whole cent within which a value counts as
/// exactly on that cent.
const CENT_SNAP_RELATIVE: f64 = 1e-12;

/// Round down to two decimal places.
///
/// Values within [`CENT_SNAP_RELATIVE`] of a whole cent are taken as that
/// cent, so amounts which are exact in decimal (0.29, 10.07) are not pushed
/// one cent lower by binary representation error. Anything further below a
/// cent boundary (10.009999999) is floored.
pub fn floor_cents(value: f64) -> f64 {
    let value = finite_or_zero(value);
    let cents = value * 100.0;
    if !cents.is_finite() {
        return value;
    }
    let nearest = cents.round();
    let whole = if (cents - nearest).abs() <= nearest.abs().max(1.0) * CENT_SNAP_RELATIVE {
        nearest
    } else {
        cents.floor()
    };
    let floored = whole / 100.0;
    if floored == 0.0 {
        0.0
    } else {
        floored
    }
}

pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_count).unwrap_or(0))
}

pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_amount).unwrap_or(0.0))
}

pub fn deserialize_split_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(split_percent_from_value(value.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(12.5)), 12.5);
        assert_eq!(coerce_amount(&json!("7.25")), 7.25);
        assert_eq!(coerce_amount(&json!(" 3 ")), 3.0);
        assert_eq!(coerce_amount(&json!(null)), 0.0);
        assert_eq!(coerce_amount(&json!("abc")), 0.0);
        assert_eq!(coerce_amount(&json!("NaN")), 0.0);
        assert_eq!(coerce_amount(&json!("inf")), 0.0);
        assert_eq!(coerce_amount(&json!({"v": 1})), 0.0);
        assert_eq!(coerce_amount(&json!([1, 2])), 0.0);
        assert_eq!(coerce_amount(&json!(true)), 1.0);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&json!(1000)), 1000);
        assert_eq!(coerce_count(&json!("250")), 250);
        assert_eq!(coerce_count(&json!(9.9)), 9);
        assert_eq!(coerce_count(&json!(-5)), 0);
        assert_eq!(coerce_count(&json!(null)), 0);
        assert_eq!(coerce_count(&json!("many")), 0);
    }

    #[test]
    fn test_split_percent_decoding() {
        assert_eq!(split_percent_from_value(None), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!(null))), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!("half"))), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!(70))), 70.0);
        assert_eq!(split_percent_from_value(Some(&json!("45.5"))), 45.5);
        assert_eq!(split_percent_from_value(Some(&json!(150))), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!(-20))), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!("-0.5"))), 100.0);
        assert_eq!(split_percent_from_value(Some(&json!(0))), 0.0);
        assert_eq!(split_percent_from_value(Some(&json!(100))), 100.0);
    }

    #[test]
    fn test_clamp_split_percent() {
        assert_eq!(clamp_split_percent(50.0), 50.0);
        assert_eq!(clamp_split_percent(f64::NAN), 100.0);
        assert_eq!(clamp_split_percent(f64::INFINITY), 100.0);
        assert_eq!(clamp_split_percent(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_floor_cents() {
        assert_eq!(floor_cents(10.0), 10.0);
        assert_eq!(floor_cents(5.009), 5.0);
        assert_eq!(floor_cents(3.14159), 3.14);
        assert_eq!(floor_cents(0.29), 0.29);
        assert_eq!(floor_cents(10.07), 10.07);
        assert_eq!(floor_cents(f64::NAN), 0.0);
        assert_eq!(floor_cents(f64::INFINITY), 0.0);
        assert_eq!(floor_cents(0.004), 0.0);
    }

    #[test]
    fn test_floor_cents_just_below_boundary() {
        assert_eq!(floor_cents(10.009999999), 10.0);
        assert_eq!(floor_cents(0.0999999), 0.09);
        // Representation error of exact decimals is still absorbed.
        assert_eq!(floor_cents(4.35), 4.35);
        assert_eq!(floor_cents(11.75 + 6.4), 18.15);
        assert_eq!(floor_cents(-1e-17), 0.0);
    }

    #[test]
    fn test_normalize_split_percent() {
        assert_eq!(normalize_split_percent(40.0), 40.0);
        assert_eq!(normalize_split_percent(0.0), 0.0);
        assert_eq!(normalize_split_percent(-15.0), 100.0);
        assert_eq!(normalize_split_percent(100.5), 100.0);
        assert_eq!(normalize_split_percent(f64::NAN), 100.0);
    }

    #[derive(Deserialize)]
    struct LenientFields {
        #[serde(default, deserialize_with = "deserialize_count")]
        views: u64,
        #[serde(default, deserialize_with = "deserialize_amount")]
        revenue: f64,
        #[serde(default = "default_split", deserialize_with = "deserialize_split_percent")]
        split: f64,
    }

    fn default_split() -> f64 {
        DEFAULT_SPLIT_PERCENT
    }

    #[test]
    fn test_serde_helpers_tolerate_garbage() {
        let decoded: LenientFields =
            serde_json::from_str(r#"{"views": null, "revenue": "oops", "split": "x"}"#).unwrap();
        assert_eq!(decoded.views, 0);
        assert_eq!(decoded.revenue, 0.0);
        assert_eq!(decoded.split, 100.0);

        let decoded: LenientFields = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded.views, 0);
        assert_eq!(decoded.revenue, 0.0);
        assert_eq!(decoded.split, 100.0);

        let decoded: LenientFields =
            serde_json::from_str(r#"{"views": "42", "revenue": 1.5, "split": 30}"#).unwrap();
        assert_eq!(decoded.views, 42);
        assert_eq!(decoded.revenue, 1.5);
        assert_eq!(decoded.split, 30.0);
    }
}
