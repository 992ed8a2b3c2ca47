use crate::db::tables::{is_admin_only, is_public};
use crate::db::{Query, SharedStore, Store};
use crate::error::HubError;
use crate::format::to_csv;
use crate::types::profile::Profile;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ExportService {
    store: SharedStore,
}

impl ExportService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Whole table as CSV, oldest first. Private tables are refused, and
    /// account, audit and settings tables need an admin.
    pub async fn table_csv(&self, actor: &Profile, table: &str) -> Result<String, HubError> {
        if !is_public(table) {
            return Err(HubError::not_found("exportable table", table));
        }
        if is_admin_only(table) && !actor.is_admin() {
            warn!(user_id = %actor.id, table, "non-admin csv export refused");
            return Err(HubError::Forbidden(format!(
                "exporting `{table}` requires the admin role"
            )));
        }
        let records = self
            .store
            .select(&Query::table(table).order_asc("created_at"))
            .await?;
        info!(table, rows = records.len(), user_id = %actor.id, "csv export");
        Ok(to_csv(&records))
    }
}
