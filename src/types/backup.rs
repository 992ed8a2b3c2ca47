use crate::db::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version written into every backup document.
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupMetadata {
    pub created_at: DateTime<Utc>,
    pub version: String,
    pub tables: Vec<String>,
    pub record_counts: BTreeMap<String, usize>,
}

/// `{ metadata, data: { table: [records] } }`; the file users download and re-upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupDocument {
    pub metadata: BackupMetadata,
    pub data: BTreeMap<String, Vec<Record>>,
}

impl BackupDocument {
    pub fn total_records(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestoreSummary {
    pub restored: BTreeMap<String, usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupAction {
    Export,
    Restore,
}

/// One line of the `backup_history` setting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupHistoryEntry {
    pub action: BackupAction,
    pub at: DateTime<Utc>,
    pub tables: usize,
    pub records: usize,
}
