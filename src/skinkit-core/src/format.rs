//! Stringification of metadata leaves.

use serde_json::Value;

/// Renders a scalar the way info properties store it.
///
/// Floats keep a trailing `.0` when integral (`7.0`, not `7`), booleans are
/// capitalised (`True`), null becomes the empty string, and composite values
/// fall back to compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_float(f),
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn format_float(f: f64) -> String {
    // Debug keeps the fractional part on integral floats
    format!("{f:?}")
}

/// Expands a leaf into its `(key, value)` variants.
///
/// Floating point values (ratings, mostly out of 10) produce five entries:
/// the raw value plus `_integer`, `_percentage`, `_rounded` and
/// `_rounded_2dp`. Anything else produces exactly one.
pub fn format_key_value(key: &str, value: &Value) -> Vec<(String, String)> {
    match value.as_f64() {
        Some(f) if value.is_f64() => vec![
            (key.to_string(), format_float(f)),
            (format!("{key}_integer"), format!("{}", f.trunc() as i64)),
            (format!("{key}_percentage"), format!("{:.0}%", f / 10.0 * 100.0)),
            (format!("{key}_rounded"), format!("{f:.1}")),
            (format!("{key}_rounded_2dp"), format!("{f:.2}")),
        ],
        _ => vec![(key.to_string(), value_to_string(value))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(pairs: Vec<(String, String)>) -> std::collections::BTreeMap<String, String> {
        pairs.into_iter().collect()
    }

    #[test]
    fn rating_expands_to_variants() {
        let out = as_map(format_key_value("rating", &json!(7.5)));
        assert_eq!(out.len(), 5);
        assert_eq!(out["rating"], "7.5");
        assert_eq!(out["rating_integer"], "7");
        assert_eq!(out["rating_percentage"], "75%");
        assert_eq!(out["rating_rounded"], "7.5");
        assert_eq!(out["rating_rounded_2dp"], "7.50");
    }

    #[test]
    fn integral_float_keeps_fraction() {
        let out = as_map(format_key_value("rating", &json!(8.0)));
        assert_eq!(out["rating"], "8.0");
        assert_eq!(out["rating_percentage"], "80%");
        assert_eq!(out["rating_rounded_2dp"], "8.00");
    }

    #[test]
    fn long_float_rounds() {
        let out = as_map(format_key_value("rating", &json!(6.849999904632568)));
        assert_eq!(out["rating_integer"], "6");
        assert_eq!(out["rating_percentage"], "68%");
        assert_eq!(out["rating_rounded"], "6.8");
        assert_eq!(out["rating_rounded_2dp"], "6.85");
    }

    #[test]
    fn integers_and_strings_are_single_keys() {
        assert_eq!(
            format_key_value("year", &json!(2014)),
            vec![("year".to_string(), "2014".to_string())]
        );
        assert_eq!(
            format_key_value("title", &json!("Heat")),
            vec![("title".to_string(), "Heat".to_string())]
        );
    }

    #[test]
    fn other_scalars_stringify() {
        assert_eq!(value_to_string(&json!(true)), "True");
        assert_eq!(value_to_string(&json!(false)), "False");
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&json!(-1)), "-1");
        assert_eq!(value_to_string(&json!(["a", 1])), r#"["a",1]"#);
    }
}
