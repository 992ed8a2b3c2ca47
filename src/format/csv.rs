use crate::db::Record;
use serde_json::Value;

/// Column order: every key in first-seen order across `records`.
pub fn columns(records: &[Record]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !cols.iter().any(|c| c == key) {
                cols.push(key.clone());
            }
        }
    }
    cols
}

/// Quote a field when it holds a comma, quote, CR or LF; inner quotes are doubled.
pub fn escape_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

fn push_row<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// CSV with an explicit column list; missing keys become empty fields.
pub fn to_csv_with_columns(records: &[Record], columns: &[String]) -> String {
    let mut out = String::new();
    if columns.is_empty() {
        return out;
    }
    push_row(&mut out, columns);
    for record in records {
        push_row(&mut out, columns.iter().map(|c| render_value(record.get(c))));
    }
    out
}

/// CSV of `records` with a header row. Empty input yields an empty string.
pub fn to_csv(records: &[Record]) -> String {
    to_csv_with_columns(records, &columns(records))
}
