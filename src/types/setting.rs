use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A key/value preference. Stored with the key as the record id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    #[serde(alias = "id")]
    pub key: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValue {
    pub value: Value,
}
