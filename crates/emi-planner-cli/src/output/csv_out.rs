use serde_json::Value;
use std::io;

use super::{is_row_set, plain};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A result holding a row set (e.g. a schedule) is written as that table;
/// otherwise the result becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let target = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match target {
        Value::Object(map) => {
            if let Some(rows) = map.values().find(|v| is_row_set(v)) {
                if let Value::Array(arr) = rows {
                    write_rows(&mut wtr, arr);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &plain(val)]);
                }
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        other => {
            let _ = wtr.write_record([&plain(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&plain(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(plain).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
