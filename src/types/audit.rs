use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: String,
    pub action: String,
    pub target_table: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
    pub created_at: DateTime<Utc>,
}
