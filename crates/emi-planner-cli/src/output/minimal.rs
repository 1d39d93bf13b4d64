use serde_json::Value;

use super::plain;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first scalar field. Row sets print their length.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "installment_amount",
        "emi",
        "total_monthly_emi",
        "outstanding_balance",
        "deleted",
        "loaded",
        "id",
    ];

    match result_obj {
        Value::Object(map) => {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", plain(val));
                        return;
                    }
                }
            }
            if let Some(Value::Object(summary)) = map.get("summary") {
                if let Some(emi) = summary.get("installment_amount") {
                    println!("{}", plain(emi));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_array() && !v.is_object()) {
                println!("{}: {}", key, plain(val));
            }
        }
        Value::Array(arr) => println!("{}", arr.len()),
        other => println!("{}", plain(other)),
    }
}
