use crate::error::HubError;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// One row of any table: a flat JSON object.
pub type Record = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Fixed-width UTC timestamp; lexical order equals chronological order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fill in `id` and `created_at` when the caller left them out.
pub fn prepare_insert(mut record: Record) -> Record {
    let has_id = match record.get(ID_FIELD) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if !has_id {
        record.insert(ID_FIELD.to_string(), Value::String(new_id()));
    }
    if !matches!(record.get(CREATED_AT_FIELD), Some(Value::String(_))) {
        record.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(now_timestamp()),
        );
    }
    record
}

/// Shallow-merge `patch` over `target`, keeping the target's id and stamping `updated_at`.
pub fn apply_patch(target: &mut Record, mut patch: Record) {
    patch.remove(ID_FIELD);
    for (k, v) in patch {
        target.insert(k, v);
    }
    target.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(now_timestamp()),
    );
}

/// The `id` of a record rendered as a string key.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record, HubError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(HubError::Validation(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, HubError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, HubError> {
    records.into_iter().map(from_record).collect()
}

/// Drop store-managed keys a client must not set directly.
pub fn strip_reserved(record: &mut Record) {
    record.remove(ID_FIELD);
    record.remove(CREATED_AT_FIELD);
    record.remove(UPDATED_AT_FIELD);
}
