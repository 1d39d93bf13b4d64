pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// True for a non-empty array whose first element is an object: a row set.
pub(crate) fn is_row_set(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_scalars() {
        assert_eq!(plain(&json!("8678")), "8678");
        assert_eq!(plain(&json!(12)), "12");
        assert_eq!(plain(&json!(null)), "");
        assert_eq!(plain(&json!(true)), "true");
    }

    #[test]
    fn test_row_set_detection() {
        assert!(is_row_set(&json!([{ "index": 1 }])));
        assert!(!is_row_set(&json!([])));
        assert!(!is_row_set(&json!(["a", "b"])));
        assert!(!is_row_set(&json!({ "index": 1 })));
    }
}
