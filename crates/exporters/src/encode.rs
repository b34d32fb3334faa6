use model::core::value::Value;
use std::fmt::Write;

/// Renders one cell as plain text for the tabular sinks. Nulls become
/// empty cells; quoting is the CSV writer's job, not ours.
pub fn text_cell(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match value {
        Value::Null => String::new(),
        Value::Int(v) => v.to_string(),
        Value::Uint(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Boolean(v) => (if *v { "1" } else { "0" }).to_string(),
        Value::Json(v) => v.to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Timestamp(ts) => ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Bytes(bytes) => encode_bytes(bytes),
    }
}

fn encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("0x");
    for byte in bytes {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}
