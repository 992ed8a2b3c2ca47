use crate::db::tables::{is_public, public_tables};
use crate::db::models::record_id;
use crate::db::{Query, Record, SharedStore, Store};
use crate::error::HubError;
use crate::service::audit::AuditService;
use crate::service::notifications::NotificationService;
use crate::service::settings::SettingsService;
use crate::types::backup::{
    BACKUP_FORMAT_VERSION, BackupAction, BackupDocument, BackupHistoryEntry, BackupMetadata,
    RestoreSummary,
};
use crate::types::notification::{NewNotification, NotificationKind};
use crate::types::profile::Profile;
use chrono::Utc;
use futures::future::try_join_all;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{error, info, warn};

pub const HISTORY_KEY: &str = "backup_history";
const HISTORY_LIMIT: usize = 50;

/// Reject documents whose metadata does not describe their data block.
pub fn validate_document(doc: &BackupDocument) -> Result<(), HubError> {
    if doc.metadata.version != BACKUP_FORMAT_VERSION {
        return Err(HubError::Validation(format!(
            "unsupported backup version `{}` (expected {BACKUP_FORMAT_VERSION})",
            doc.metadata.version
        )));
    }
    if let Some(unknown) = doc.data.keys().find(|t| !is_public(t)) {
        return Err(HubError::Validation(format!(
            "backup contains unknown table `{unknown}`"
        )));
    }
    let listed: BTreeSet<&str> = doc.metadata.tables.iter().map(String::as_str).collect();
    let present: BTreeSet<&str> = doc.data.keys().map(String::as_str).collect();
    if listed != present {
        return Err(HubError::Validation(
            "backup metadata table list does not match its data".into(),
        ));
    }
    for (table, records) in &doc.data {
        let declared = doc.metadata.record_counts.get(table).copied();
        if declared != Some(records.len()) {
            return Err(HubError::Validation(format!(
                "record count mismatch for `{table}`: metadata says {declared:?}, data has {}",
                records.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = records
            .iter()
            .filter_map(record_id)
            .find(|id| !seen.insert(id.clone()))
        {
            return Err(HubError::Validation(format!(
                "backup repeats id `{dup}` in `{table}`"
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct BackupService {
    store: SharedStore,
    settings: SettingsService,
    notifications: NotificationService,
    audit: AuditService,
}

impl BackupService {
    pub fn new(
        store: SharedStore,
        settings: SettingsService,
        notifications: NotificationService,
        audit: AuditService,
    ) -> Self {
        Self {
            store,
            settings,
            notifications,
            audit,
        }
    }

    /// Snapshot every public table.
    pub async fn export(&self, actor: &Profile) -> Result<BackupDocument, HubError> {
        let tables = public_tables();
        let store = &self.store;
        let dumps = try_join_all(
            tables
                .iter()
                .map(|t| async move { store.select(&Query::table(*t)).await }),
        )
        .await?;

        let data: BTreeMap<String, _> = tables
            .iter()
            .map(|t| t.to_string())
            .zip(dumps)
            .collect();
        let doc = BackupDocument {
            metadata: BackupMetadata {
                created_at: Utc::now(),
                version: BACKUP_FORMAT_VERSION.to_string(),
                tables: data.keys().cloned().collect(),
                record_counts: data.iter().map(|(t, r)| (t.clone(), r.len())).collect(),
            },
            data,
        };
        let records = doc.total_records();
        info!(actor = %actor.id, tables = tables.len(), records, "backup exported");
        let prior = self.history().await;
        self.append_history(prior, BackupAction::Export, tables.len(), records)
            .await;
        self.audit
            .log(actor, "backup_export", "backup", None, Some(json!({ "records": records })))
            .await;
        Ok(doc)
    }

    /// Replace the listed tables with the document's records.
    pub async fn restore(
        &self,
        actor: &Profile,
        doc: BackupDocument,
    ) -> Result<RestoreSummary, HubError> {
        validate_document(&doc)?;
        // the restored settings table would otherwise replace the history
        let prior = self.history().await;
        let table_count = doc.data.len();
        let mut restored: BTreeMap<String, usize> = BTreeMap::new();
        for (table, records) in doc.data {
            let previous = self.store.select(&Query::table(table.as_str())).await?;
            let removed = self.store.clear(&table).await?;
            let inserted = match self.fill(&table, records).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    warn!(table = %table, error = %e, "restore failed, putting previous rows back");
                    self.rollback(&table, previous).await;
                    return Err(e);
                }
            };
            info!(table = %table, removed, inserted, "table restored");
            restored.insert(table, inserted);
        }
        let total: usize = restored.values().sum();

        self.append_history(prior, BackupAction::Restore, table_count, total)
            .await;
        self.audit
            .log(actor, "backup_restore", "backup", None, Some(json!({ "records": total })))
            .await;
        if let Err(e) = self
            .notifications
            .create(NewNotification {
                title: "Backup restored".to_string(),
                message: format!("{total} records restored across {table_count} tables."),
                kind: NotificationKind::Backup,
                item_id: None,
            })
            .await
        {
            warn!(error = %e, "failed to raise restore notification");
        }
        Ok(RestoreSummary { restored, total })
    }

    async fn fill(&self, table: &str, records: Vec<Record>) -> Result<usize, HubError> {
        let mut inserted: usize = 0;
        for record in records {
            self.store.insert(table, record).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn rollback(&self, table: &str, previous: Vec<Record>) {
        let result: Result<usize, HubError> = async {
            self.store.clear(table).await?;
            self.fill(table, previous).await
        }
        .await;
        match result {
            Ok(rows) => info!(table, rows, "previous rows restored"),
            Err(e) => error!(table, error = %e, "rollback failed; table may be incomplete"),
        }
    }

    /// Most recent last.
    pub async fn history(&self) -> Result<Vec<BackupHistoryEntry>, HubError> {
        match self.settings.find(HISTORY_KEY).await? {
            Some(setting) => Ok(serde_json::from_value(setting.value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn append_history(
        &self,
        prior: Result<Vec<BackupHistoryEntry>, HubError>,
        action: BackupAction,
        tables: usize,
        records: usize,
    ) {
        let result: Result<_, HubError> = async {
            let mut history = prior?;
            history.push(BackupHistoryEntry {
                action,
                at: Utc::now(),
                tables,
                records,
            });
            let excess = history.len().saturating_sub(HISTORY_LIMIT);
            history.drain(..excess);
            self.settings
                .put(HISTORY_KEY, serde_json::to_value(history)?)
                .await
        }
        .await;
        if let Err(e) = result {
            warn!(action = ?action, error = %e, "failed to record backup history");
        }
    }
}
