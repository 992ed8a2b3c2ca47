use point_art_hub::db::Record;
use point_art_hub::format::csv::{columns, escape_field, to_csv};
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn empty_input_yields_empty_output() {
    assert_eq!(to_csv(&[]), "");
}

#[test]
fn escaping_rules() {
    assert_eq!(escape_field("plain"), "plain");
    assert_eq!(escape_field("a,b"), "\"a,b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    assert_eq!(escape_field("cr\rhere"), "\"cr\rhere\"");
}

#[test]
fn header_is_union_of_keys() {
    let rows = vec![
        record(json!({"name": "Pen", "quantity": 3})),
        record(json!({"name": "Mug", "sku": "M-1"})),
    ];
    let cols = columns(&rows);
    assert_eq!(cols.len(), 3);
    for c in ["name", "quantity", "sku"] {
        assert!(cols.iter().any(|x| x == c));
    }
    let csv = to_csv(&rows);
    let mut lines = csv.lines();
    let header = lines.next().expect("header");
    assert_eq!(header.split(',').count(), 3);
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn nulls_are_empty_and_nested_values_are_json() {
    let rows = vec![record(json!({"a": null, "b": {"x": 1}}))];
    let csv = to_csv(&rows);
    assert_eq!(csv, "a,b\n,\"{\"\"x\"\":1}\"\n");
}

#[test]
fn round_trips_through_a_csv_parser() {
    let rows = vec![
        record(json!({"id": "1", "name": "Frame, large", "notes": "He said \"wow\"", "price": 1500.5})),
        record(json!({"id": "2", "name": "Card\nwith newline", "notes": null, "price": 20})),
        record(json!({"id": "3", "name": "Plain", "notes": "ok", "price": 0})),
    ];
    let csv = to_csv(&rows);

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let parsed: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("valid csv");
    assert_eq!(parsed.len(), rows.len());

    for (row, source) in parsed.iter().zip(&rows) {
        for (i, col) in headers.iter().enumerate() {
            let expected = match source.get(col) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            assert_eq!(&row[i], expected.as_str(), "column {col}");
        }
    }
}
