use crate::db::models::{from_record, to_record};
use crate::db::tables::AUDIT_LOG;
use crate::db::{Query, SharedStore, StoreExt};
use crate::error::HubError;
use crate::types::audit::AuditEntry;
use crate::types::profile::Profile;
use serde_json::{Value, json};
use tracing::warn;

#[derive(Clone)]
pub struct AuditService {
    store: SharedStore,
}

impl AuditService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        actor: &Profile,
        action: &str,
        target_table: &str,
        target_id: Option<&str>,
        detail: Option<Value>,
    ) -> Result<AuditEntry, HubError> {
        let entry = json!({
            "actor_id": actor.id,
            "action": action,
            "target_table": target_table,
            "target_id": target_id,
            "detail": detail,
        });
        let stored = self.store.insert(AUDIT_LOG, to_record(&entry)?).await?;
        from_record(stored)
    }

    /// Fire-and-forget variant: the audited action already succeeded.
    pub async fn log(
        &self,
        actor: &Profile,
        action: &str,
        target_table: &str,
        target_id: Option<&str>,
        detail: Option<Value>,
    ) {
        if let Err(e) = self
            .record(actor, action, target_table, target_id, detail)
            .await
        {
            warn!(actor = %actor.id, action, error = %e, "failed to write audit entry");
        }
    }

    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<AuditEntry>, HubError> {
        let mut query = Query::table(AUDIT_LOG).order_desc("created_at");
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.store.fetch(&query).await
    }
}
