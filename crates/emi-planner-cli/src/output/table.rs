use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{is_row_set, plain};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of a result go into a Field/Value table; every row set
/// (periods, yearly_summary, loans, ...) gets its own table underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        Value::Array(arr) => print_rows(arr),
        other => println!("{}", plain(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut row_sets = Vec::new();

    for (key, val) in map {
        if is_row_set(val) {
            row_sets.push((key, val));
        } else if let Value::Object(inner) = val {
            for (inner_key, inner_val) in inner {
                builder.push_record([format!("{key}.{inner_key}"), format_cell(inner_val)]);
            }
        } else {
            builder.push_record([key.clone(), format_cell(val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, rows) in row_sets {
        if let Value::Array(arr) = rows {
            println!("\n{}:", key);
            print_rows(arr);
        }
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_cell(item));
        }
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        other => plain(other),
    }
}
